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

use super::{KeplerSnafu, PvgError, StateCostate};
use crate::propagators::shepperd_stm;
use snafu::ResultExt;

/// Propagates a coast arc of duration `dt` in normalized units.
///
/// The position and velocity follow the exact two-body solution. The costates obey the adjoint of the
/// variational equations, so the pair (PV, -PR) evolves exactly like a perturbation (dr, dv) of the state and
/// is mapped by the same state transition matrix. Mass and mass costate do not change.
pub fn propagate(y0: &StateCostate, dt: f64) -> Result<StateCostate, PvgError> {
    let stm = shepperd_stm(1.0, dt, y0.r(), y0.v()).context(KeplerSnafu)?;
    let pv0 = y0.pv();
    let pr0 = y0.pr();

    let mut yf = *y0;
    yf.set_r(stm.r);
    yf.set_v(stm.v);
    yf.set_pv(stm.rr * pv0 - stm.rv * pr0);
    yf.set_pr(stm.vv * pr0 - stm.vr * pv0);
    Ok(yf)
}
