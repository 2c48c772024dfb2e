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
use std::fmt;

/// Provides different methods for controlling the error computation of the integrator.
pub mod error_ctrl;
pub use self::error_ctrl::*;

/// Exact two-body propagation and its state transition matrix.
pub mod shepperd;
pub use self::shepperd::{shepperd, shepperd_stm, KeplerStm};

// Re-Export
mod instance;
pub use instance::*;
mod propagator;
pub use propagator::*;
mod rk_methods;
pub use rk_methods::*;
mod options;
pub use options::*;

/// Stores the details of the previous integration step of a given propagator. Access as `my_prop.clone().latest_details()`.
#[derive(Copy, Clone, Debug)]
pub struct IntegrationDetails {
    /// step size used
    pub step: f64,
    /// error in the previous integration step
    pub error: f64,
    /// number of attempts needed by an adaptive step size to be within the tolerance
    pub attempts: u8,
}

impl fmt::Display for IntegrationDetails {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IntegrationDetails {{step: {:e}, error: {:.3e}, attempts: {}}}",
            self.step, self.error, self.attempts
        )
    }
}

#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropagationError {
    #[snafu(display("dynamics error at t = {t}: {reason}"))]
    Dynamics { t: f64, reason: String },
    #[snafu(display("integration produced a non finite state at t = {t}"))]
    NonFiniteState { t: f64 },
    #[snafu(display("cannot propagate until the non finite time {tf}"))]
    InvalidTime { tf: f64 },
    #[snafu(display(
        "step of {step:e} at t = {t} has an error of {error:e} above the tolerance of {tolerance:e}, with no smaller step or attempt left"
    ))]
    ToleranceNotMet {
        t: f64,
        step: f64,
        error: f64,
        tolerance: f64,
    },
}
