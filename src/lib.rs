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

/*! # pvg-core

The numerical core of a rocket ascent and orbital maneuver planner:

+ exact two-body propagation with the state transition matrix (Shepperd's universal variable method),
+ Lambert's problem, including multi-revolution transfers (Izzo's method),
+ state and costate propagation across thrust and coast arcs for primer vector guidance (indirect optimal control),
+ the scalar root finders used throughout.

All of the functions here are pure and synchronous: they never share mutable state, and every iteration cap
surfaces as a typed error carrying the last iterate.
*/

/// Provides the two-body propagator and the adaptive Runge Kutta stepping used by the costate integrators.
pub mod propagators;

/// Utility functions shared by different modules, including the vector and matrix extensions.
pub mod utils;

/// Configuration loading from YAML files.
pub mod io;

/// Mission design tools: the costate integrators, phases, solutions and terminal constraints.
pub mod md;

/// Simple tools (Lambert solver, root finders)
pub mod tools;

/// Polynomial and Hermite interpolation module
pub mod polyfit;

#[macro_use]
extern crate log;
extern crate nalgebra as na;

/// Re-export nalgebra, along with the three dimensional aliases used throughout this crate.
pub mod linalg {
    pub use na::base::*;

    /// A three dimensional vector of doubles, copied by value.
    pub type V3 = Vector3<f64>;
    /// A three by three matrix of doubles, copied by value.
    pub type M3 = Matrix3<f64>;
}

pub use self::linalg::{M3, V3};
pub use self::md::pvg::{Phase, PvgError, PvgIntegrator, Scale, Solution, StateCostate};
pub use self::propagators::shepperd::KeplerError;
pub use self::tools::lambert::LambertError;
pub use self::tools::roots::RootError;
