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

use super::polynomial::Polynomial;
use super::{InterpolationError, InvalidInterpolationDataSnafu};
use snafu::ensure;

/// Builds a polynomial interpolation using the Hermite method, matching both the values and the
/// first derivatives at the provided abscissas. With `n` samples, the degree should be at least `2n - 1`.
///
/// The coefficients are computed with Newton's divided differences where every node is repeated twice.
///
/// ```
/// use pvg_core::polyfit::hermite;
///
/// let xs = [-1.0, 1.0];
/// let ys = [1.0, 1.0];
/// let derivs = [-2.0, 2.0];
///
/// // x^2 is exactly represented by a cubic Hermite polynomial
/// let poly = hermite::<4>(&xs, &ys, &derivs).unwrap();
/// assert!((poly.eval(0.5) - 0.25).abs() < 1e-15);
/// ```
pub fn hermite<const DEGREE: usize>(
    xs: &[f64],
    ys: &[f64],
    derivs: &[f64],
) -> Result<Polynomial<DEGREE>, InterpolationError> {
    ensure!(
        !xs.is_empty(),
        InvalidInterpolationDataSnafu {
            msg: "No X data to interpolate"
        }
    );
    ensure!(
        xs.len() == ys.len(),
        InvalidInterpolationDataSnafu {
            msg: "Lengths of X and Y data differ"
        }
    );
    ensure!(
        xs.len() == derivs.len(),
        InvalidInterpolationDataSnafu {
            msg: "Lengths of X and its derivatives data differ"
        }
    );

    if DEGREE < 2 * xs.len() {
        warn!(
            "Building Hermite interpolation of {} coefficients with {} samples, {} recommended",
            DEGREE,
            xs.len(),
            2 * xs.len()
        );
    }

    let size = 2 * xs.len();
    // Doubled nodes, and the divided differences table, column by column
    let zs: Vec<f64> = xs.iter().flat_map(|x| [*x, *x]).collect();
    let mut table: Vec<Vec<f64>> = vec![ys.iter().flat_map(|y| [*y, *y]).collect()];

    for order in 1..size {
        let prev = &table[order - 1];
        let mut column = vec![0.0; size];
        for i in order..size {
            let dz = zs[i] - zs[i - order];
            column[i] = if order == 1 && dz == 0.0 {
                // Repeated node: the first divided difference is the derivative
                derivs[i / 2]
            } else {
                (prev[i] - prev[i - 1]) / dz
            };
        }
        table.push(column);
    }

    // Newton form, evaluated from the highest order down
    let mut poly = Polynomial::<DEGREE>::zeros();
    for i in (1..size).rev() {
        poly += table[i][i];
        poly = poly.mul_by_root(zs[i - 1]);
    }
    poly += table[0][0];

    ensure!(
        !poly.is_nan(),
        InvalidInterpolationDataSnafu {
            msg: format!("Invalid interpolation {poly}")
        }
    );

    Ok(poly)
}

#[test]
fn hermite_cosine_test() {
    let xs: Vec<_> = (0..8).map(|i| i as f64).collect();
    let ys: Vec<_> = xs.iter().map(|x| x.cos()).collect();
    let derivs: Vec<_> = xs.iter().map(|x| -x.sin()).collect();

    let tol = 1e-10;
    let poly = hermite::<16>(&xs, &ys, &derivs).unwrap();

    for x in xs {
        let (eval, deriv) = poly.eval_n_deriv(x);
        assert!((eval - x.cos()).abs() < tol);
        assert!((deriv + x.sin()).abs() < tol);
    }
}

#[test]
fn hermite_cubic_test() {
    // A cubic is exactly represented by the Hermite interpolation on two nodes
    let f = |x: f64| 2.0 * x.powi(3) - x + 0.5;
    let df = |x: f64| 6.0 * x.powi(2) - 1.0;
    let xs = [-1.0, 1.0];
    let poly = hermite::<4>(&xs, &[f(-1.0), f(1.0)], &[df(-1.0), df(1.0)]).unwrap();
    for i in -10..=10 {
        let x = i as f64 / 10.0;
        assert!((poly.eval(x) - f(x)).abs() < 1e-14);
        assert!((poly.deriv(x) - df(x)).abs() < 1e-13);
    }
}

#[test]
fn hermite_invalid_test() {
    assert!(hermite::<4>(&[], &[], &[]).is_err());
    assert!(hermite::<4>(&[0.0, 1.0], &[0.0], &[0.0, 1.0]).is_err());
    assert!(hermite::<4>(&[0.0, 1.0], &[0.0, 1.0], &[0.0]).is_err());
}
