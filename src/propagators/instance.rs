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

use super::error_ctrl::ErrorCtrl;
use super::{
    Dynamics, IntegrationDetails, InvalidTimeSnafu, NonFiniteStateSnafu, PropagationError,
    Propagator, ToleranceNotMetSnafu,
};
use crate::linalg::SVector;
use snafu::ensure;

/// A PropInstance is a propagation in progress: it holds the current time and state, and the step size
/// adapted during the previous step.
#[derive(Debug)]
pub struct PropInstance<'a, D: Dynamics<N>, E: ErrorCtrl, const N: usize> {
    /// The time of the current state
    pub t: f64,
    /// The state of this propagator instance
    pub state: SVector<f64, N>,
    /// The propagator setup (kind, stages, etc.)
    pub prop: &'a Propagator<D, E, N>,
    /// Stores the details of the previous integration step
    pub details: IntegrationDetails,
    pub(crate) step_size: f64, // Stores the adapted step for the _next_ call
    pub(crate) fixed_step: bool,
    // Allows us to do pre-allocation of the ki vectors
    pub(crate) k: Vec<SVector<f64, N>>,
}

impl<D: Dynamics<N>, E: ErrorCtrl, const N: usize> PropInstance<'_, D, E, N> {
    /// Allows setting the step size of the propagator
    pub fn set_step(&mut self, step_size: f64, fixed: bool) {
        self.step_size = step_size;
        self.fixed_step = fixed;
    }

    /// Propagates the dynamics until the provided time, forward or backward, and returns the state at that time.
    pub fn until(&mut self, tf: f64) -> Result<SVector<f64, N>, PropagationError> {
        ensure!(tf.is_finite(), InvalidTimeSnafu { tf });
        if tf == self.t {
            return Ok(self.state);
        }

        let backprop = tf < self.t;
        // The step always points toward the stop time
        self.step_size = if backprop {
            -self.step_size.abs()
        } else {
            self.step_size.abs()
        };

        loop {
            if (!backprop && self.t + self.step_size > tf) || (backprop && self.t + self.step_size <= tf)
            {
                if tf == self.t {
                    // No propagation necessary
                    return Ok(self.state);
                }
                // Take one final step of exactly the needed duration until the stop time
                let prev_step_size = self.step_size;
                let prev_step_kind = self.fixed_step;
                self.set_step(tf - self.t, true);

                self.single_step()?;
                // Avoid any round off in the final time
                self.t = tf;

                // Restore the step size for subsequent calls
                self.set_step(prev_step_size, prev_step_kind);
                return Ok(self.state);
            } else {
                self.single_step()?;
            }
        }
    }

    /// Take a single propagator step
    pub fn single_step(&mut self) -> Result<(), PropagationError> {
        let (step, state_vec) = self.derive()?;
        self.t += step;
        self.state = state_vec;
        Ok(())
    }

    /// This method integrates the dynamics over one step, adapting the step size if needed.
    ///
    /// This function returns the step sized used and the new state as y_{n+1} = y_n + \frac{dy_n}{dt}.
    /// To get the integration details, check `self.latest_details`.
    fn derive(&mut self) -> Result<(f64, SVector<f64, N>), PropagationError> {
        let state_vec = self.state;
        let t = self.t;
        // Reset the number of attempts used (we don't reset the error because it's set before it's read)
        self.details.attempts = 1;
        // It's mutable because we may change it below
        let mut step_size = self.step_size;
        loop {
            self.k[0] = self.prop.dynamics.eom(t, &state_vec)?;
            let mut a_idx: usize = 0;
            for i in 0..(self.prop.stages - 1) {
                // Let's compute the c_i by summing the relevant items from the list of coefficients.
                // \sum_{j=1}^{i-1} a_ij  ∀ i ∈ [2, s]
                let mut ci: f64 = 0.0;
                // The wi stores the a_{s1} * k_1 + a_{s2} * k_2 + ... + a_{s, s-1} * k_{s-1} +
                let mut wi = SVector::<f64, N>::zeros();
                for kj in &self.k[0..i + 1] {
                    let a_ij = self.prop.a_coeffs[a_idx];
                    ci += a_ij;
                    wi += a_ij * kj;
                    a_idx += 1;
                }

                self.k[i + 1] = self
                    .prop
                    .dynamics
                    .eom(t + ci * step_size, &(state_vec + step_size * wi))?;
            }
            // Compute the next state and the error
            let mut next_state = state_vec;
            let mut error_est = SVector::<f64, N>::zeros();
            for (i, ki) in self.k.iter().enumerate() {
                let b_i = self.prop.b_coeffs[i];
                if !self.fixed_step {
                    let b_i_star = self.prop.b_coeffs[i + self.prop.stages];
                    error_est += step_size * (b_i - b_i_star) * ki;
                }
                next_state += step_size * b_i * ki;
            }

            ensure!(
                next_state.iter().all(|x| x.is_finite()),
                NonFiniteStateSnafu { t: t + step_size }
            );

            if self.fixed_step {
                // Using a fixed step, no adaptive step necessary
                self.details.step = step_size;
                return Ok((step_size, next_state));
            }

            // The step direction is preserved, the options apply to its magnitude
            let direction = step_size.signum();
            let magnitude = step_size.abs();
            let opts = &self.prop.opts;

            self.details.error = E::estimate(&error_est, &next_state, &state_vec);
            if self.details.error > opts.tolerance
                && (magnitude <= opts.min_step || self.details.attempts >= opts.attempts)
            {
                error!(
                    "step of {step_size:e} at t = {t} has an error of {:e} after {} attempts, above the tolerance of {:e}",
                    self.details.error, self.details.attempts, opts.tolerance
                );
                return ToleranceNotMetSnafu {
                    t,
                    step: step_size,
                    error: self.details.error,
                    tolerance: opts.tolerance,
                }
                .fail();
            }

            if self.details.error <= opts.tolerance {
                self.details.step = step_size;
                let mut next_magnitude = magnitude;
                if self.details.error < opts.tolerance {
                    // Error is less than tolerance, let's attempt to increase the step for the next iteration.
                    let proposed_step = 0.9
                        * magnitude
                        * (opts.tolerance / self.details.error).powf(1.0 / f64::from(self.prop.order));
                    next_magnitude = proposed_step.min(opts.max_step);
                }
                // In all cases, let's update the step size to whatever was the adapted step size
                self.step_size = direction * next_magnitude;
                return Ok((step_size, next_state));
            } else {
                // Error is too high and we aren't using the smallest step, and we haven't hit the max number of attempts.
                // So let's adapt the step size.
                self.details.attempts += 1;
                let proposed_step = 0.9
                    * magnitude
                    * (opts.tolerance / self.details.error).powf(1.0 / f64::from(self.prop.order - 1));
                step_size = direction * proposed_step.max(opts.min_step);
                // Note that we don't set self.step_size, that will be updated right before we return
            }
        }
    }

    /// Copy the details of the latest integration step.
    pub fn latest_details(&self) -> IntegrationDetails {
        self.details
    }
}
