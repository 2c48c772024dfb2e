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

use crate::linalg::SVector;
use serde_derive::{Deserialize, Serialize};

// Below this magnitude of the state change, the error is taken as absolute rather than relative.
const REL_ERR_THRESH: f64 = 0.1;

/// An ErrorCtrl computes the scalar error of an integration step from the embedded error estimate,
/// which the adaptive step size logic then compares to the tolerance.
pub trait ErrorCtrl: Copy + Default + Send + Sync {
    /// Computes the actual error of the current step.
    ///
    /// `error_est` is the difference between the two embedded solutions, `candidate` is the proposed next
    /// state, and `cur_state` is the state at the start of the step.
    fn estimate<const N: usize>(
        error_est: &SVector<f64, N>,
        candidate: &SVector<f64, N>,
        cur_state: &SVector<f64, N>,
    ) -> f64;
}

/// An RSS step error control which computes the L2 norm of the error relative to the change of state over the step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RSSStep;

impl ErrorCtrl for RSSStep {
    fn estimate<const N: usize>(
        error_est: &SVector<f64, N>,
        candidate: &SVector<f64, N>,
        cur_state: &SVector<f64, N>,
    ) -> f64 {
        let mag = (candidate - cur_state).norm();
        let err = error_est.norm();
        if mag > REL_ERR_THRESH {
            err / mag
        } else {
            err
        }
    }
}
