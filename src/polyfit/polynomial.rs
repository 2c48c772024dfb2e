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

use std::fmt;
use std::ops;

/// Polynomial is a statically allocated polynomial.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Polynomial<const SIZE: usize> {
    /// Coefficients are orders by their power, e.g. index 0 is to the power 0, 1 is linear, 2 is quadratic, etc.
    pub coefficients: [f64; SIZE],
}

impl<const SIZE: usize> Polynomial<SIZE> {
    pub fn from_most_significant(mut coeffs: [f64; SIZE]) -> Self {
        coeffs.reverse();
        Self {
            coefficients: coeffs,
        }
    }

    /// Initializes a Polynomial with only zeros
    pub fn zeros() -> Self {
        Self {
            coefficients: [0.0; SIZE],
        }
    }

    /// Get the order of the polynomial
    pub const fn order(&self) -> usize {
        SIZE - 1
    }

    /// Evaluate the polynomial at the provided position
    pub fn eval(&self, x: f64) -> f64 {
        self.eval_n_deriv(x).0
    }

    /// Evaluate the derivative at the provided position
    pub fn deriv(&self, x: f64) -> f64 {
        self.eval_n_deriv(x).1
    }

    /// Evaluate the polynomial and its derivative at the provided position, with Horner's scheme.
    pub fn eval_n_deriv(&self, x: f64) -> (f64, f64) {
        let mut value = 0.0;
        let mut deriv = 0.0;
        for c in self.coefficients.iter().rev() {
            deriv = deriv * x + value;
            value = value * x + c;
        }
        (value, deriv)
    }

    /// Returns true if any of the coefficients are NaN
    pub fn is_nan(&self) -> bool {
        self.coefficients.iter().any(|c| c.is_nan())
    }

    /// Multiplies this polynomial by `(x - root)`, dropping the coefficient that overflows the storage.
    pub(crate) fn mul_by_root(&self, root: f64) -> Self {
        let mut rslt = Self::zeros();
        for (power, c) in self.coefficients.iter().enumerate() {
            rslt.coefficients[power] -= root * c;
            if power + 1 < SIZE {
                rslt.coefficients[power + 1] += c;
            }
        }
        rslt
    }
}

impl<const SIZE: usize> ops::Mul<f64> for Polynomial<SIZE> {
    type Output = Polynomial<SIZE>;

    fn mul(mut self, rhs: f64) -> Self::Output {
        for val in &mut self.coefficients {
            *val *= rhs;
        }
        self
    }
}

impl<const SIZE: usize> ops::AddAssign<f64> for Polynomial<SIZE> {
    fn add_assign(&mut self, rhs: f64) {
        self.coefficients[0] += rhs;
    }
}

impl<const SIZE: usize> fmt::Display for Polynomial<SIZE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "P(t) =")?;
        for (i, c) in self.coefficients.iter().enumerate().rev() {
            if *c == 0.0 {
                continue;
            }
            match i {
                0 => write!(f, " {c:+e}")?,
                1 => write!(f, " {c:+e} t")?,
                _ => write!(f, " {c:+e} t^{i}")?,
            }
        }
        Ok(())
    }
}
