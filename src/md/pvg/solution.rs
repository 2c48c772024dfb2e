/*
    pvg-core, primer vector guidance and two-body astrodynamics
    Copyright (C) 2021 Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{
    EmptySolutionSnafu, InterpolationSnafu, InvalidIntervalSnafu, InvalidLengthSnafu, OutOfRangeSnafu, Phase,
    PvgError, StateCostate, STATE_COSTATE_SIZE,
};
use crate::polyfit::hermite;
use crate::V3;
use snafu::{ensure, OptionExt, ResultExt};

/// Number of equally spaced interior nodes sampled by the integrators for each phase
pub const INTERIOR_NODES: usize = 20;

/// Dense representation of one phase: the state and costate vector and its time derivative at each node.
/// Between two nodes, each slot is a cubic Hermite polynomial matching both values and derivatives.
#[derive(Clone, Debug)]
pub struct Interpolant {
    times: Vec<f64>,
    states: Vec<StateCostate>,
    derivs: Vec<StateCostate>,
}

impl Interpolant {
    pub fn new(times: Vec<f64>, states: Vec<StateCostate>, derivs: Vec<StateCostate>) -> Result<Self, PvgError> {
        ensure!(
            times.len() >= 2 && states.len() == times.len() && derivs.len() == times.len(),
            InvalidLengthSnafu { len: times.len() }
        );
        for pair in times.windows(2) {
            ensure!(
                pair[1] > pair[0],
                InvalidIntervalSnafu {
                    t0: pair[0],
                    tf: pair[1]
                }
            );
        }
        Ok(Self {
            times,
            states,
            derivs,
        })
    }

    /// Node times of a phase spanning `[t0, tf]`: both ends and the equally spaced interior nodes.
    pub fn node_times(t0: f64, tf: f64) -> Vec<f64> {
        let intervals = INTERIOR_NODES + 1;
        let dt = (tf - t0) / intervals as f64;
        let mut times: Vec<f64> = (0..intervals).map(|k| t0 + k as f64 * dt).collect();
        times.push(tf);
        times
    }

    pub fn t0(&self) -> f64 {
        self.times[0]
    }

    pub fn tf(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[StateCostate] {
        &self.states
    }

    /// Evaluates the interpolant at the provided time, which must be within the nodes.
    pub fn evaluate(&self, t: f64) -> Result<StateCostate, PvgError> {
        ensure!(
            t >= self.t0() && t <= self.tf(),
            OutOfRangeSnafu {
                t,
                t0: self.t0(),
                tf: self.tf()
            }
        );
        let idx = match self.times.binary_search_by(|ti| ti.total_cmp(&t)) {
            // Exactly on a node
            Ok(idx) => return Ok(self.states[idx]),
            Err(idx) => idx,
        };

        let (ta, tb) = (self.times[idx - 1], self.times[idx]);
        let (ya, yb) = (&self.states[idx - 1], &self.states[idx]);
        let (da, db) = (&self.derivs[idx - 1], &self.derivs[idx]);
        // The local abscissa is in [-1, 1], so the derivatives are scaled by half the interval
        let half = 0.5 * (tb - ta);
        let s = (t - ta) / half - 1.0;

        let mut y = StateCostate::zeros();
        for i in 0..STATE_COSTATE_SIZE {
            let poly = hermite::<4>(&[-1.0, 1.0], &[ya[i], yb[i]], &[da[i] * half, db[i] * half])
                .context(InterpolationSnafu)?;
            y[i] = poly.eval(s);
        }
        Ok(y)
    }
}

/// One phase of a [`Solution`]
#[derive(Clone, Debug)]
pub struct Segment {
    pub t0: f64,
    pub tf: f64,
    pub phase: Phase,
    pub interpolant: Interpolant,
}

/// An ordered, append-only sequence of phase interpolants which can be queried at any time they cover.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    segments: Vec<Segment>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a segment. Segments must be appended in time order and may only share their boundaries.
    pub fn add_segment(&mut self, t0: f64, tf: f64, interpolant: Interpolant, phase: Phase) -> Result<(), PvgError> {
        ensure!(t0 < tf, InvalidIntervalSnafu { t0, tf });
        if let Some(last) = self.segments.last() {
            ensure!(t0 >= last.tf, InvalidIntervalSnafu { t0: last.tf, tf: t0 });
        }
        debug!("adding segment [{t0}, {tf}] for {phase}");
        self.segments.push(Segment {
            t0,
            tf,
            phase,
            interpolant,
        });
        Ok(())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Start time of the first segment
    pub fn t0(&self) -> Option<f64> {
        self.segments.first().map(|s| s.t0)
    }

    /// End time of the last segment
    pub fn tf(&self) -> Option<f64> {
        self.segments.last().map(|s| s.tf)
    }

    /// Index of the segment covering time `t`. On a boundary shared by two segments, this is the later one.
    pub fn segment_index(&self, t: f64) -> Result<usize, PvgError> {
        let t0 = self.t0().context(EmptySolutionSnafu)?;
        let tf = self.tf().context(EmptySolutionSnafu)?;
        ensure!(t >= t0 && t <= tf, OutOfRangeSnafu { t, t0, tf });
        let idx = self.segments.partition_point(|s| s.tf <= t);
        if idx < self.segments.len() && self.segments[idx].t0 <= t {
            Ok(idx)
        } else if t == tf {
            Ok(self.segments.len() - 1)
        } else {
            // Gap between two segments
            OutOfRangeSnafu { t, t0, tf }.fail()
        }
    }

    /// The interpolated state and costate vector at time `t`
    pub fn state_at(&self, t: f64) -> Result<StateCostate, PvgError> {
        let idx = self.segment_index(t)?;
        self.segments[idx].interpolant.evaluate(t)
    }

    pub fn r(&self, t: f64) -> Result<V3, PvgError> {
        Ok(self.state_at(t)?.r())
    }

    pub fn v(&self, t: f64) -> Result<V3, PvgError> {
        Ok(self.state_at(t)?.v())
    }

    pub fn pv(&self, t: f64) -> Result<V3, PvgError> {
        Ok(self.state_at(t)?.pv())
    }

    pub fn pr(&self, t: f64) -> Result<V3, PvgError> {
        Ok(self.state_at(t)?.pr())
    }

    pub fn m(&self, t: f64) -> Result<f64, PvgError> {
        Ok(self.state_at(t)?.m())
    }

    pub fn dv(&self, t: f64) -> Result<f64, PvgError> {
        Ok(self.state_at(t)?.dv())
    }

    /// Thrust direction at time `t`: zero during coasts, the phase's fixed direction for unguided burns,
    /// and the normalized primer vector otherwise.
    pub fn u(&self, t: f64) -> Result<V3, PvgError> {
        let idx = self.segment_index(t)?;
        let segment = &self.segments[idx];
        if segment.phase.coast {
            return Ok(V3::zeros());
        }
        let y = segment.interpolant.evaluate(t)?;
        Ok(segment.phase.thrust_direction(&y.pv()))
    }
}
