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

use super::{NonFiniteSnafu, NotBracketedSnafu, RootError};
use snafu::ensure;

fn checked_pair<F>(f: &mut F, x: f64) -> Result<(f64, f64), RootError>
where
    F: FnMut(f64) -> (f64, f64),
{
    let (y, dy) = f(x);
    ensure!(!y.is_nan() && !dy.is_nan(), NonFiniteSnafu { x });
    Ok((y, dy))
}

/// Safeguarded Newton iteration on the bracket `[x1, x2]`, where `f` returns both the residual and its derivative.
///
/// Each iteration takes the Newton step unless it would leave the current bracket or would not halve the
/// bracket over two iterations, in which case it bisects. Convergence is therefore guaranteed for any
/// continuous function with a sign change on the bracket. Returns when the step is below `tol`.
pub fn newton<F>(mut f: F, x1: f64, x2: f64, tol: f64, max_iter: usize) -> Result<f64, RootError>
where
    F: FnMut(f64) -> (f64, f64),
{
    let (fl, _) = checked_pair(&mut f, x1)?;
    let (fh, _) = checked_pair(&mut f, x2)?;

    if fl == 0.0 {
        return Ok(x1);
    } else if fh == 0.0 {
        return Ok(x2);
    }

    ensure!(
        fl.signum() != fh.signum(),
        NotBracketedSnafu {
            a: x1,
            b: x2,
            fa: fl,
            fb: fh
        }
    );

    // Orient the search so that f(xl) < 0
    let (mut xl, mut xh) = if fl < 0.0 { (x1, x2) } else { (x2, x1) };

    let mut rts = 0.5 * (x1 + x2);
    let mut dx_old = (x2 - x1).abs();
    let mut dx = dx_old;
    let (mut fx, mut dfx) = checked_pair(&mut f, rts)?;

    for _ in 0..max_iter {
        let out_of_bracket = ((rts - xh) * dfx - fx) * ((rts - xl) * dfx - fx) > 0.0;
        let too_slow = (2.0 * fx).abs() > (dx_old * dfx).abs();

        if out_of_bracket || too_slow {
            dx_old = dx;
            dx = 0.5 * (xh - xl);
            rts = xl + dx;
            if xl == rts {
                return Ok(rts);
            }
        } else {
            dx_old = dx;
            dx = fx / dfx;
            let prev = rts;
            rts -= dx;
            if prev == rts {
                return Ok(rts);
            }
        }

        if dx.abs() < tol {
            return Ok(rts);
        }

        (fx, dfx) = checked_pair(&mut f, rts)?;
        if fx == 0.0 {
            return Ok(rts);
        } else if fx < 0.0 {
            xl = rts;
        } else {
            xh = rts;
        }
    }

    error!("Newton solver failed after {max_iter} iterations");
    Err(RootError::MaxIterations {
        iterations: max_iter,
        last: rts,
    })
}
