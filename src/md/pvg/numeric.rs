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

use super::{Phase, PropagationSnafu, PvgError, StateCostate, STATE_COSTATE_SIZE};
use crate::linalg::SVector;
use crate::propagators::{Dynamics, DynamicsSnafu, PropOpts, PropagationError, Propagator, RSSStep};
use snafu::{ensure, ResultExt};

/// Vacuum thrust dynamics of the state and its costates, in normalized units.
///
/// + dR/dt = V
/// + dV/dt = -R/r^3 + a u
/// + dPV/dt = -PR
/// + dPR/dt = PV/r^3 - 3 (R.PV) R / r^5
/// + dM/dt = -mdot (zero with the infinite thrust idealization)
/// + dPm/dt = a (PV.u) / M
/// + dDV/dt = a
#[derive(Copy, Clone, Debug)]
pub struct PvgDynamics {
    pub phase: Phase,
}

impl PvgDynamics {
    pub fn new(phase: Phase) -> Self {
        Self { phase }
    }

    /// Time derivative of the provided state and costate vector
    pub fn derivative(&self, t: f64, y: &StateCostate) -> Result<StateCostate, PropagationError> {
        Ok(StateCostate(self.eom(t, &y.0)?))
    }
}

impl Dynamics<STATE_COSTATE_SIZE> for PvgDynamics {
    fn eom(
        &self,
        t: f64,
        state: &SVector<f64, STATE_COSTATE_SIZE>,
    ) -> Result<SVector<f64, STATE_COSTATE_SIZE>, PropagationError> {
        let y = StateCostate(*state);
        let r = y.r();
        let pv = y.pv();
        let m = y.m();

        let rmag = r.norm();
        ensure!(
            rmag > 0.0,
            DynamicsSnafu {
                t,
                reason: "gravity is singular at the origin"
            }
        );
        ensure!(
            self.phase.coast || self.phase.infinite || m > 0.0,
            DynamicsSnafu {
                t,
                reason: format!("mass depleted ({m})")
            }
        );

        let r3 = rmag.powi(3);
        let r5 = r3 * rmag * rmag;
        let a = self.phase.acceleration(m);
        let u = self.phase.thrust_direction(&pv);

        let mut dy = StateCostate::zeros();
        dy.set_r(y.v());
        dy.set_v(-r / r3 + a * u);
        dy.set_pv(-y.pr());
        dy.set_pr(pv / r3 - 3.0 * r.dot(&pv) / r5 * r);
        dy.set_m(-self.phase.mass_rate());
        if a > 0.0 {
            dy.set_pm(a * pv.dot(&u) / m);
        }
        dy.set_dv(a);
        Ok(dy.0)
    }
}

/// Integrates the state and costates from `t0` to each of the provided times with an adaptive Dormand Prince 5(4) scheme.
/// The times must be sorted; the first output corresponds to the first time.
pub(crate) fn propagate_nodes(
    y0: &StateCostate,
    phase: &Phase,
    times: &[f64],
    opts: &PropOpts<RSSStep>,
) -> Result<Vec<StateCostate>, PvgError> {
    let prop = Propagator::dp45(PvgDynamics::new(*phase), *opts);
    let mut instance = prop.with(times.first().copied().unwrap_or_default(), y0.0);
    let mut states = Vec::with_capacity(times.len());
    for t in times {
        states.push(StateCostate(instance.until(*t).context(PropagationSnafu)?));
    }
    trace!("numeric PVG arc with {opts}: {}", instance.latest_details());
    Ok(states)
}

/// Integrates the state and costates from `t0` to `tf` with an adaptive Dormand Prince 5(4) scheme.
pub fn propagate(
    y0: &StateCostate,
    phase: &Phase,
    t0: f64,
    tf: f64,
    opts: &PropOpts<RSSStep>,
) -> Result<StateCostate, PvgError> {
    let prop = Propagator::dp45(PvgDynamics::new(*phase), *opts);
    let yf = prop.with(t0, y0.0).until(tf).context(PropagationSnafu)?;
    Ok(StateCostate(yf))
}
