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

use snafu::prelude::*;

mod brent;
mod newton;

pub use brent::{brent, brent_bracketed};
pub use newton::newton;

/// Errors of the scalar root finders.
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RootError {
    #[snafu(display("root is not bracketed: f({a}) = {fa} and f({b}) = {fb} share a sign"))]
    NotBracketed { a: f64, b: f64, fa: f64, fb: f64 },
    #[snafu(display("no sign change found around {x0} after {expansions} expansions"))]
    BracketNotFound { x0: f64, expansions: usize },
    #[snafu(display("root finder did not converge after {iterations} iterations (last iterate {last})"))]
    MaxIterations { iterations: usize, last: f64 },
    #[snafu(display("function evaluated to a non finite value at {x}"))]
    NonFinite { x: f64 },
}

/// Default number of iterations of the root finders when the caller has no better estimate.
pub const DEFAULT_MAX_ITER: usize = 100;

/// Evaluates the closure and rejects NaN residuals, which would otherwise silently break the bracket logic.
pub(crate) fn checked<F>(f: &mut F, x: f64) -> Result<f64, RootError>
where
    F: FnMut(f64) -> f64,
{
    let y = f(x);
    ensure!(!y.is_nan(), NonFiniteSnafu { x });
    Ok(y)
}

/// Given a converged bracket, returns the endpoint whose residual has the requested sign.
/// A zero sign hint returns the endpoint with the smallest residual.
pub(crate) fn pick_endpoint(xa: f64, ya: f64, xb: f64, yb: f64, sign: i8) -> f64 {
    match sign.signum() {
        0 => {
            if ya.abs() < yb.abs() {
                xa
            } else {
                xb
            }
        }
        s => {
            if (ya > 0.0) == (s > 0) {
                xa
            } else {
                xb
            }
        }
    }
}
