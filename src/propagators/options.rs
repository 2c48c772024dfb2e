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

use super::{ErrorCtrl, RSSStep};
use crate::io::ConfigRepr;
use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// PropOpts stores the integrator options, including the minimum and maximum step sizes, and the
/// max error size. All of the steps are in the (usually normalized) time unit of the dynamics.
///
/// Note that different step sizes and max errors are only used for adaptive
/// methods. To use a fixed step integrator, initialize the options using `with_fixed_step`.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder, Serialize, Deserialize)]
#[builder(doc)]
pub struct PropOpts<E: ErrorCtrl> {
    #[builder(default = 1e-2)]
    pub init_step: f64,
    #[builder(default = 1e-9)]
    pub min_step: f64,
    #[builder(default = 1.0)]
    pub max_step: f64,
    #[builder(default = 1e-10)]
    pub tolerance: f64,
    #[builder(default = 50)]
    pub attempts: u8,
    #[builder(default = false)]
    #[serde(default)]
    pub fixed_step: bool,
    #[builder(default)]
    #[serde(default)]
    pub error_ctrl: E,
}

impl<E: ErrorCtrl> fmt::Display for PropOpts<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fixed_step {
            write!(f, "fixed step: {:e}", self.min_step,)
        } else {
            write!(
                f,
                "min_step: {:e}, max_step: {:e}, tol: {:e}, attempts: {}",
                self.min_step, self.max_step, self.tolerance, self.attempts,
            )
        }
    }
}

impl PropOpts<RSSStep> {
    /// `with_fixed_step` initializes an `PropOpts` such that the integrator is used with a fixed
    ///  step size.
    pub fn with_fixed_step(step: f64) -> Self {
        PropOpts {
            init_step: step,
            min_step: step,
            max_step: step,
            tolerance: 0.0,
            fixed_step: true,
            attempts: 0,
            error_ctrl: RSSStep,
        }
    }

    /// Returns the default options with a specific tolerance.
    #[allow(clippy::field_reassign_with_default)]
    pub fn with_tolerance(tolerance: f64) -> Self {
        let mut opts = Self::default();
        opts.tolerance = tolerance;
        opts
    }
}

impl Default for PropOpts<RSSStep> {
    /// Default options tuned for normalized units, where one time unit is the inverse of the mean motion at the reference radius.
    fn default() -> PropOpts<RSSStep> {
        PropOpts {
            init_step: 1e-2,
            min_step: 1e-9,
            max_step: 1.0,
            tolerance: 1e-10,
            attempts: 50,
            fixed_step: false,
            error_ctrl: RSSStep,
        }
    }
}

impl ConfigRepr for PropOpts<RSSStep> {}

#[test]
fn test_options() {
    let opts = PropOpts::with_fixed_step(1e-1);
    assert_eq!(opts.min_step, 1e-1);
    assert_eq!(opts.max_step, 1e-1);
    assert!(opts.tolerance.abs() < f64::EPSILON);
    assert!(opts.fixed_step);

    let opts: PropOpts<RSSStep> = Default::default();
    assert_eq!(opts.init_step, 1e-2);
    assert_eq!(opts.min_step, 1e-9);
    assert_eq!(opts.max_step, 1.0);
    assert!((opts.tolerance - 1e-10).abs() < f64::EPSILON);
    assert_eq!(opts.attempts, 50);
    assert!(!opts.fixed_step);

    let built = PropOpts::<RSSStep>::builder().build();
    assert_eq!(built, PropOpts::default());
    assert_eq!(format!("{built}"), "min_step: 1e-9, max_step: 1e0, tol: 1e-10, attempts: 50");
}

#[test]
fn test_options_yaml() {
    let opts = PropOpts::<RSSStep>::loads_many("- init_step: 0.5\n  min_step: 1.0e-6\n  max_step: 0.5\n  tolerance: 1.0e-9\n  attempts: 20\n").unwrap();
    assert_eq!(opts.len(), 1);
    assert_eq!(opts[0].init_step, 0.5);
    assert_eq!(opts[0].attempts, 20);
    assert!(!opts[0].fixed_step);
}
