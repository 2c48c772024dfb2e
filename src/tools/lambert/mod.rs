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

use crate::linalg::V3;
use snafu::prelude::*;

mod izzo;

pub use izzo::{izzo, izzo_all, izzo_kind};

/// Householder tolerance on the change of x for the zero revolution branch
const LAMBERT_EPSILON: f64 = 1e-5;
/// Householder tolerance on the change of x for the multi revolution branches
const LAMBERT_EPSILON_MULTI: f64 = 1e-8;
/// Maximum number of Householder iterations per branch
const MAX_ITERATIONS: usize = 15;
/// Maximum number of Halley iterations when refining the minimum time of flight of the multi revolution branches
const MAX_ITERATIONS_TMIN: usize = 12;
/// Tolerance of the Battin hypergeometric series
const BATTIN_TOLERANCE: f64 = 1e-11;

/// Errors of the Lambert solver.
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LambertError {
    #[snafu(display("time of flight must be strictly positive, got {tof}"))]
    InvalidTimeOfFlight { tof: f64 },
    #[snafu(display("gravitational parameter must be strictly positive, got {mu}"))]
    InvalidMu { mu: f64 },
    #[snafu(display("Lambert geometry is degenerate: {reason}"))]
    DegenerateGeometry { reason: &'static str },
    #[snafu(display("Householder iterations did not converge after {maxiter} iterations (last x = {last})"))]
    SolverMaxIter { maxiter: usize, last: f64 },
    #[snafu(display("time of flight derivative vanished at x = {x}"))]
    ZeroDerivative { x: f64 },
}

/// Define the transfer kind for a single revolution Lambert transfer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransferKind {
    /// Prograde motion about +Z, whichever way is shorter or longer
    Auto,
    /// Transfer angle below 180 degrees
    ShortWay,
    /// Transfer angle above 180 degrees
    LongWay,
}

impl TransferKind {
    /// Returns whether the motion must be flipped with respect to the direction of `r_init x r_final`,
    /// which is the direction of motion of the short way.
    fn flip(self, r_init: &V3, r_final: &V3) -> bool {
        match self {
            TransferKind::Auto => r_init.cross(r_final).z < 0.0,
            TransferKind::ShortWay => false,
            TransferKind::LongWay => true,
        }
    }
}

/// One branch of the solution of Lambert's problem.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LambertSolution {
    /// Departure velocity
    pub v_init: V3,
    /// Arrival velocity
    pub v_final: V3,
    /// Number of complete revolutions of this branch
    pub revs: usize,
    /// Number of Householder iterations used
    pub iterations: usize,
    /// Converged value of Izzo's x variable
    pub x: f64,
}
