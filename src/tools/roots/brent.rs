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

use super::{checked, pick_endpoint};
use super::{BracketNotFoundSnafu, NotBracketedSnafu, RootError};
use snafu::ensure;
use std::f64::consts::SQRT_2;

/// Finds a root of `f` in the bracket `[a, b]` using Brent's method (inverse quadratic interpolation,
/// secant, and bisection).
///
/// The residuals at `a` and `b` must have opposite signs (or one of them must be zero), else this returns
/// [`RootError::NotBracketed`]. Iterations stop when the residual is exactly zero or when the bracket is
/// narrower than `tol`. In the latter case, the `sign` hint selects which side of the root is returned:
/// `1` returns the endpoint with a positive residual, `-1` the endpoint with a negative residual, and `0`
/// the endpoint with the smallest residual.
pub fn brent_bracketed<F>(
    mut f: F,
    a: f64,
    b: f64,
    tol: f64,
    max_iter: usize,
    sign: i8,
) -> Result<f64, RootError>
where
    F: FnMut(f64) -> f64,
{
    let mut xa = a;
    let mut xb = b;
    let mut ya = checked(&mut f, xa)?;
    let mut yb = checked(&mut f, xb)?;

    if ya == 0.0 {
        return Ok(xa);
    } else if yb == 0.0 {
        return Ok(xb);
    }

    ensure!(
        ya.signum() != yb.signum(),
        NotBracketedSnafu {
            a,
            b,
            fa: ya,
            fb: yb
        }
    );

    // Keep b as the best guess so far
    if ya.abs() < yb.abs() {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut ya, &mut yb);
    }

    let (mut xc, mut yc, mut xd) = (xa, ya, xa);
    let mut bisected = true;

    for _ in 0..max_iter {
        let delta = tol.abs().max(2.0 * f64::EPSILON * xb.abs());
        if yb == 0.0 {
            return Ok(xb);
        }
        if (xb - xa).abs() <= delta {
            trace!("brent converged on [{xa}, {xb}] with residuals [{ya:e}, {yb:e}]");
            return Ok(pick_endpoint(xa, ya, xb, yb, sign));
        }

        let mut s = if ya != yc && yb != yc {
            // Inverse quadratic interpolation
            xa * yb * yc / ((ya - yb) * (ya - yc))
                + xb * ya * yc / ((yb - ya) * (yb - yc))
                + xc * ya * yb / ((yc - ya) * (yc - yb))
        } else {
            // Secant
            xb - yb * (xb - xa) / (yb - ya)
        };

        let not_between = (s - xb) * (s - (3.0 * xa + xb) / 4.0) > 0.0;
        let slow_after_bisect = bisected && (s - xb).abs() >= (xb - xc).abs() / 2.0;
        let slow_after_interp = !bisected && (s - xb).abs() >= (xc - xd).abs() / 2.0;
        let tiny_after_bisect = bisected && (xb - xc).abs() < delta;
        let tiny_after_interp = !bisected && (xc - xd).abs() < delta;

        if not_between
            || slow_after_bisect
            || slow_after_interp
            || tiny_after_bisect
            || tiny_after_interp
            || !s.is_finite()
        {
            s = 0.5 * (xa + xb);
            bisected = true;
        } else {
            bisected = false;
        }

        let ys = checked(&mut f, s)?;
        xd = xc;
        xc = xb;
        yc = yb;

        if ya.signum() != ys.signum() {
            xb = s;
            yb = ys;
        } else {
            xa = s;
            ya = ys;
        }

        if ya.abs() < yb.abs() {
            std::mem::swap(&mut xa, &mut xb);
            std::mem::swap(&mut ya, &mut yb);
        }
    }

    error!("Brent solver failed after {max_iter} iterations");
    Err(RootError::MaxIterations {
        iterations: max_iter,
        last: xb,
    })
}

/// Finds a root of `f` near `x0`: the interval `x0 ± dx` grows by a factor of sqrt(2) until the residuals
/// at its ends change sign, then [`brent_bracketed`] refines it.
///
/// The initial half width is 2% of `|x0|`, or 0.02 if `x0` is zero. After `max_iter` expansions without
/// a sign change this returns [`RootError::BracketNotFound`].
pub fn brent<F>(mut f: F, x0: f64, tol: f64, max_iter: usize, sign: i8) -> Result<f64, RootError>
where
    F: FnMut(f64) -> f64,
{
    let mut dx = if x0 == 0.0 { 1.0 / 50.0 } else { x0.abs() / 50.0 };

    for expansion in 0..max_iter {
        let a = x0 - dx;
        let b = x0 + dx;
        let fa = checked(&mut f, a)?;
        let fb = checked(&mut f, b)?;
        if fa == 0.0 || fb == 0.0 || fa.signum() != fb.signum() {
            debug!("bracketed root around {x0} in [{a}, {b}] after {expansion} expansions");
            return brent_bracketed(&mut f, a, b, tol, max_iter, sign);
        }
        dx *= SQRT_2;
    }

    error!("could not bracket a root around {x0} after {max_iter} expansions");
    BracketNotFoundSnafu {
        x0,
        expansions: max_iter,
    }
    .fail()
}
