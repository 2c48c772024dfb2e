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

use super::{NonFiniteSnafu, NotNormalizedSnafu, Phase, PvgError, StateCostate};
use crate::V3;
use snafu::ensure;

/// Weights of Milne's (Boole's) rule over four equal sub-intervals, to be scaled by 2h/45
const MILNE_WEIGHTS: [f64; 5] = [7.0, 32.0, 12.0, 32.0, 7.0];

/// Propagates a vacuum thrust arc of duration `dt` with the closed form quadrature.
///
/// Gravity is linearized about the initial radius, i.e. modeled as a harmonic oscillator of angular rate
/// `w = r0^(-3/2)`. In that field the primer vector rotates in closed form regardless of the thrust history:
///
/// ```text
/// PV(s) = PV0 cos(ws) - PR0 sin(ws) / w
/// PR(s) = PV0 w sin(ws) + PR0 cos(ws)
/// ```
///
/// The thrust acceleration only enters through the convolution integrals `Ic = int a u cos(ws)` and
/// `Is = int a u sin(ws)`, evaluated with Milne's rule on five points, so that:
///
/// ```text
/// R = R0 cos(w dt) + V0 sin(w dt) / w + (sin(w dt) Ic - cos(w dt) Is) / w
/// V = -R0 w sin(w dt) + V0 cos(w dt) + cos(w dt) Ic + sin(w dt) Is
/// ```
///
/// This is only accurate for arcs which are short compared to the orbital period.
pub fn propagate(y0: &StateCostate, phase: &Phase, dt: f64) -> Result<StateCostate, PvgError> {
    ensure!(phase.normalized, NotNormalizedSnafu);

    let r0 = y0.r();
    let v0 = y0.v();
    let pv0 = y0.pv();
    let pr0 = y0.pr();
    let m0 = y0.m();

    let w = r0.norm().powf(-1.5);
    ensure!(
        w.is_finite(),
        NonFiniteSnafu {
            what: "angular rate at the initial radius"
        }
    );

    let mdot = phase.mass_rate();
    let h = dt / 4.0;
    let mut ic = V3::zeros();
    let mut is = V3::zeros();
    let mut pm_rate_sum = 0.0;
    for (k, weight) in MILNE_WEIGHTS.iter().enumerate() {
        let s = k as f64 * h;
        let (sin_ws, cos_ws) = (w * s).sin_cos();
        let pv = pv0 * cos_ws - pr0 * (sin_ws / w);
        let u = phase.thrust_direction(&pv);
        let m = m0 - mdot * s;
        let a = phase.acceleration(m);

        ic += *weight * a * cos_ws * u;
        is += *weight * a * sin_ws * u;
        pm_rate_sum += *weight * a * pv.dot(&u) / m;
    }
    let quad = 2.0 * h / 45.0;
    ic *= quad;
    is *= quad;

    let (sin_wt, cos_wt) = (w * dt).sin_cos();
    let mut yf = *y0;
    yf.set_r(r0 * cos_wt + v0 * (sin_wt / w) + (ic * sin_wt - is * cos_wt) / w);
    yf.set_v(-r0 * (w * sin_wt) + v0 * cos_wt + ic * cos_wt + is * sin_wt);
    yf.set_pv(pv0 * cos_wt - pr0 * (sin_wt / w));
    yf.set_pr(pv0 * (w * sin_wt) + pr0 * cos_wt);
    yf.set_pm(y0.pm() + quad * pm_rate_sum);

    if phase.infinite {
        yf.set_dv(y0.dv() + phase.acceleration(m0) * dt);
    } else {
        let mf = m0 - mdot * dt;
        yf.set_m(mf);
        yf.set_dv(y0.dv() + phase.ve * (m0 / mf).ln());
    }

    ensure!(
        yf.is_finite(),
        NonFiniteSnafu {
            what: "closed form thrust arc"
        }
    );
    Ok(yf)
}
