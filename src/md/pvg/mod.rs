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

/*! Costate augmented trajectory integration for primer vector guidance (PVG).

A trajectory is an ordered sequence of [`Phase`]s. Each phase is integrated in isolation from the terminal
state and costate vector of the previous one, by one of the three integrators of [`PvgIntegrator`]:

+ `Coast`: exact two-body propagation, with the costates mapped by the state transition matrix;
+ `Analytic`: closed form quadrature of a short vacuum thrust arc;
+ `Numeric`: adaptive Dormand Prince integration of the full nonlinear costate dynamics.

All of the integrators work in normalized units, where the gravitational parameter is one (cf. [`Scale`]).
*/

use crate::io::ConfigError;
use crate::polyfit::InterpolationError;
use crate::propagators::shepperd::KeplerError;
use crate::propagators::{PropOpts, PropagationError, RSSStep};
use snafu::prelude::*;

pub mod analytic;
pub mod coast;
pub mod numeric;
mod phase;
mod solution;
mod state;
pub mod terminal;

pub use numeric::PvgDynamics;
pub use phase::{Phase, Scale, STD_GRAVITY};
pub use solution::{Interpolant, Segment, Solution, INTERIOR_NODES};
pub use state::*;
pub use terminal::Terminal;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PvgError {
    #[snafu(display("closed form thrust integration requires a normalized phase"))]
    NotNormalized,
    #[snafu(display("non finite value in {what}"))]
    NonFinite { what: &'static str },
    #[snafu(display("invalid interval [{t0}, {tf}]"))]
    InvalidInterval { t0: f64, tf: f64 },
    #[snafu(display("state and costate vector requires 14 or 15 values, got {len}"))]
    InvalidLength { len: usize },
    #[snafu(display("propellant of {m0} depleted at a rate of {mdot} before the end of the {dt} long phase"))]
    MassDepleted { m0: f64, mdot: f64, dt: f64 },
    #[snafu(display("time {t} is not covered by the solution [{t0}, {tf}]"))]
    OutOfRange { t: f64, t0: f64, tf: f64 },
    #[snafu(display("solution has no segment"))]
    EmptySolution,
    #[snafu(display("{phases} phases provided for {intervals} intervals"))]
    PhaseMismatch { phases: usize, intervals: usize },
    #[snafu(display("invalid phase: {source}"))]
    InvalidPhase { source: ConfigError },
    #[snafu(display("coast propagation failed: {source}"))]
    Kepler { source: KeplerError },
    #[snafu(display("thrust integration failed: {source}"))]
    Propagation { source: PropagationError },
    #[snafu(display("dense output failed: {source}"))]
    Interpolation { source: InterpolationError },
}

/// The integrator used for a given phase, dispatched by `match`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PvgIntegrator {
    Coast,
    Analytic,
    Numeric(PropOpts<RSSStep>),
}

impl PvgIntegrator {
    /// Coast phases use the exact coast, burns flagged `analytic` use the closed form quadrature, and all other
    /// burns use the adaptive integrator with the default options.
    pub fn for_phase(phase: &Phase) -> Self {
        if phase.coast {
            Self::Coast
        } else if phase.analytic {
            Self::Analytic
        } else {
            Self::Numeric(PropOpts::default())
        }
    }

    /// Checks the inputs shared by all integrators
    fn validate(y0: &StateCostate, phase: &Phase, t0: f64, tf: f64) -> Result<(), PvgError> {
        ensure!(y0.is_finite(), NonFiniteSnafu { what: "initial vector" });
        ensure!(
            t0.is_finite() && tf.is_finite() && tf >= t0,
            InvalidIntervalSnafu { t0, tf }
        );
        phase.validate().context(InvalidPhaseSnafu)?;
        let dt = tf - t0;
        let mdot = phase.mass_rate();
        ensure!(
            y0.m() - mdot * dt > 0.0,
            MassDepletedSnafu {
                m0: y0.m(),
                mdot,
                dt
            }
        );
        Ok(())
    }

    /// Integrates the state and costate vector across the phase, from `t0` to `tf`, and returns the final vector.
    pub fn integrate(&self, y0: &StateCostate, phase: &Phase, t0: f64, tf: f64) -> Result<StateCostate, PvgError> {
        Self::validate(y0, phase, t0, tf)?;
        if tf == t0 {
            return Ok(*y0);
        }
        debug!("{self:?} integration of {phase} over [{t0}, {tf}]");
        let yf = match self {
            Self::Coast => coast::propagate(y0, tf - t0)?,
            Self::Analytic => analytic::propagate(y0, phase, tf - t0)?,
            Self::Numeric(opts) => numeric::propagate(y0, phase, t0, tf, opts)?,
        };
        ensure!(yf.is_finite(), NonFiniteSnafu { what: "final vector" });
        Ok(yf)
    }

    /// Integrates like [`PvgIntegrator::integrate`] and also appends the dense representation of this phase to the solution.
    pub fn integrate_into(
        &self,
        y0: &StateCostate,
        phase: &Phase,
        t0: f64,
        tf: f64,
        solution: &mut Solution,
    ) -> Result<StateCostate, PvgError> {
        Self::validate(y0, phase, t0, tf)?;
        ensure!(tf > t0, InvalidIntervalSnafu { t0, tf });
        debug!("{self:?} integration of {phase} over [{t0}, {tf}] with dense output");

        // Closed form nodes are all computed from the initial vector, so that the last one is the
        // result of `integrate`.
        let times = Interpolant::node_times(t0, tf);
        let states = match self {
            Self::Coast => times
                .iter()
                .map(|t| coast::propagate(y0, t - t0))
                .collect::<Result<Vec<_>, _>>()?,
            Self::Analytic => times
                .iter()
                .map(|t| analytic::propagate(y0, phase, t - t0))
                .collect::<Result<Vec<_>, _>>()?,
            Self::Numeric(opts) => numeric::propagate_nodes(y0, phase, &times, opts)?,
        };

        let dynamics = PvgDynamics::new(*phase);
        let derivs = times
            .iter()
            .zip(&states)
            .map(|(t, y)| dynamics.derivative(*t, y))
            .collect::<Result<Vec<_>, _>>()
            .context(PropagationSnafu)?;

        let yf = states[states.len() - 1];
        ensure!(yf.is_finite(), NonFiniteSnafu { what: "final vector" });

        let interpolant = Interpolant::new(times, states, derivs)?;
        solution.add_segment(t0, tf, interpolant, *phase)?;
        Ok(yf)
    }
}

/// Integrates a sequence of phases, threading the final vector of each phase as the initial vector of the next.
/// The mass is reset to the initial mass of each phase at its start, which models staging.
pub fn integrate_phases(
    y0: &StateCostate,
    phases: &[Phase],
    intervals: &[(f64, f64)],
    mut solution: Option<&mut Solution>,
) -> Result<StateCostate, PvgError> {
    ensure!(
        phases.len() == intervals.len(),
        PhaseMismatchSnafu {
            phases: phases.len(),
            intervals: intervals.len()
        }
    );
    let mut y = *y0;
    for (phase, (t0, tf)) in phases.iter().zip(intervals) {
        y.set_m(phase.m0);
        let integrator = PvgIntegrator::for_phase(phase);
        y = match solution.as_deref_mut() {
            Some(solution) => integrator.integrate_into(&y, phase, *t0, *tf, solution)?,
            None => integrator.integrate(&y, phase, *t0, *tf)?,
        };
    }
    Ok(y)
}
