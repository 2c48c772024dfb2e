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

use super::StateCostate;
use crate::io::{ConfigError, ConfigRepr, InvalidConfigSnafu};
use crate::utils::V3Ext;
use crate::V3;
use serde_derive::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

/// Standard gravity in meters per second squared, used to convert a specific impulse into an exhaust velocity
pub const STD_GRAVITY: f64 = 9.80665;

/// A Phase describes one arc of a trajectory: either a coast or a burn at constant thrust.
///
/// The integrators only ever read a phase, they never modify it. All of the fields are in consistent units,
/// and the integrators require those units to be normalized (cf. [`Scale`] and [`Phase::rescale`]).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct Phase {
    /// Mass at the start of the phase
    pub m0: f64,
    /// Propellant mass flow rate
    #[builder(default)]
    #[serde(default)]
    pub mdot: f64,
    /// Thrust magnitude
    #[builder(default)]
    #[serde(default)]
    pub thrust: f64,
    /// Effective exhaust velocity
    #[builder(default)]
    #[serde(default)]
    pub ve: f64,
    /// Fixed thrust direction of unguided phases
    #[builder(default = V3::zeros())]
    #[serde(default = "V3::zeros")]
    pub u0: V3,
    /// Thrust along `u0` instead of along the primer vector
    #[builder(default)]
    #[serde(default)]
    pub unguided: bool,
    /// Constant acceleration idealization of an impulsive burn: the thrust is doubled and no mass is expelled
    #[builder(default)]
    #[serde(default)]
    pub infinite: bool,
    /// Set once the phase has been non-dimensionalized
    #[builder(default)]
    #[serde(default)]
    pub normalized: bool,
    #[builder(default)]
    #[serde(default)]
    pub coast: bool,
    /// Use the closed form quadrature instead of the adaptive integrator for this burn
    #[builder(default)]
    #[serde(default)]
    pub analytic: bool,
    /// Nominal burn time, if known
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub bt: Option<f64>,
}

impl Phase {
    /// A coast phase of a vehicle of mass `m0`
    pub fn coast(m0: f64) -> Self {
        Self::builder().m0(m0).coast(true).build()
    }

    /// A guided burn at constant thrust. The exhaust velocity is computed from the specific impulse `isp`
    /// (in seconds), so the thrust and mass must be in SI units (Newtons and kilograms).
    pub fn burn(m0: f64, thrust: f64, isp: f64) -> Self {
        let ve = isp * STD_GRAVITY;
        Self::builder()
            .m0(m0)
            .thrust(thrust)
            .ve(ve)
            .mdot(thrust / ve)
            .build()
    }

    /// Returns a copy of this phase that thrusts along the fixed direction `u0`.
    pub fn with_unguided(mut self, u0: V3) -> Self {
        self.unguided = true;
        self.u0 = u0.safe_normalize();
        self
    }

    /// Returns a copy of this phase using the constant acceleration idealization.
    pub fn with_infinite(mut self) -> Self {
        self.infinite = true;
        self
    }

    /// Returns a copy of this phase integrated with the closed form quadrature.
    pub fn with_analytic(mut self) -> Self {
        self.analytic = true;
        self
    }

    /// Thrust acceleration for the provided mass: `2 thrust / m0` with the infinite thrust idealization,
    /// `thrust / m` otherwise.
    pub fn acceleration(&self, m: f64) -> f64 {
        if self.coast {
            0.0
        } else if self.infinite {
            2.0 * self.thrust / self.m0
        } else {
            self.thrust / m
        }
    }

    /// Mass flow actually expelled during this phase
    pub fn mass_rate(&self) -> f64 {
        if self.coast || self.infinite {
            0.0
        } else {
            self.mdot
        }
    }

    /// Thrust direction: the fixed `u0` of unguided phases, the normalized primer vector otherwise.
    pub fn thrust_direction(&self, pv: &V3) -> V3 {
        if self.unguided {
            self.u0
        } else {
            pv.safe_normalize()
        }
    }

    /// Time until all of the mass is expelled, infinite if no mass flows.
    pub fn depletion_time(&self) -> f64 {
        let mdot = self.mass_rate();
        if mdot > 0.0 {
            self.m0 / mdot
        } else {
            f64::INFINITY
        }
    }

    /// Returns a normalized copy of this phase. A phase which is already normalized is returned unchanged.
    pub fn rescale(&self, scale: &Scale) -> Self {
        if self.normalized {
            return *self;
        }
        let mut me = *self;
        me.m0 = self.m0 / scale.mass;
        me.mdot = self.mdot / scale.mass * scale.time;
        me.thrust = self.thrust / scale.force;
        me.ve = self.ve / scale.velocity;
        me.bt = self.bt.map(|bt| bt / scale.time);
        me.normalized = true;
        me
    }

    /// Checks the consistency of this phase.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.m0.is_finite() && self.m0 > 0.0,
            InvalidConfigSnafu {
                msg: format!("initial mass must be strictly positive, got {}", self.m0)
            }
        );
        for (name, value) in [("mdot", self.mdot), ("thrust", self.thrust), ("ve", self.ve)] {
            ensure!(
                value.is_finite() && value >= 0.0,
                InvalidConfigSnafu {
                    msg: format!("{name} must be non-negative, got {value}")
                }
            );
        }
        if self.coast {
            ensure!(
                self.thrust == 0.0 && !self.analytic,
                InvalidConfigSnafu {
                    msg: "coast phase cannot thrust nor be analytic"
                }
            );
        } else {
            ensure!(
                self.thrust > 0.0,
                InvalidConfigSnafu {
                    msg: "burn phase requires a strictly positive thrust"
                }
            );
            ensure!(
                self.infinite || self.mdot > 0.0,
                InvalidConfigSnafu {
                    msg: "finite thrust burn requires a strictly positive mass flow rate"
                }
            );
        }
        ensure!(
            !self.unguided || (V3Ext::is_finite(&self.u0) && self.u0.norm() > 0.0),
            InvalidConfigSnafu {
                msg: "unguided phase requires a non zero thrust direction"
            }
        );
        if let Some(bt) = self.bt {
            ensure!(
                bt.is_finite() && bt >= 0.0,
                InvalidConfigSnafu {
                    msg: format!("burn time must be non-negative, got {bt}")
                }
            );
        }
        if !self.coast && !self.infinite && self.ve > 0.0 {
            let expected = self.mdot * self.ve;
            if ((expected - self.thrust) / self.thrust).abs() > 1e-6 {
                warn!(
                    "thrust {} differs from mdot * ve = {expected}, the delta-v bookkeeping will not match the dynamics",
                    self.thrust
                );
            }
        }
        Ok(())
    }
}

impl ConfigRepr for Phase {}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.coast {
            write!(f, "coast (m0 = {})", self.m0)
        } else {
            write!(
                f,
                "{}{}{} burn (m0 = {}, thrust = {}, mdot = {}, ve = {})",
                if self.infinite { "infinite " } else { "" },
                if self.unguided { "unguided" } else { "guided" },
                if self.analytic { " analytic" } else { "" },
                self.m0,
                self.thrust,
                self.mdot,
                self.ve
            )
        }
    }
}

/// Scale converts dimensional quantities into the normalized units where the gravitational parameter is one.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub length: f64,
    pub time: f64,
    pub velocity: f64,
    pub mass: f64,
    pub acceleration: f64,
    pub force: f64,
}

impl Scale {
    /// Builds the scale from a reference length (typically the initial radius), the gravitational parameter
    /// and a reference mass (typically the initial mass), all in consistent units.
    pub fn new(length: f64, mu: f64, mass: f64) -> Self {
        let time = (length.powi(3) / mu).sqrt();
        let velocity = length / time;
        let acceleration = velocity / time;
        Self {
            length,
            time,
            velocity,
            mass,
            acceleration,
            force: mass * acceleration,
        }
    }

    /// Normalizes the position, velocity, mass and delta-v of the provided vector. The costates are left unchanged.
    pub fn normalize(&self, y: &StateCostate) -> StateCostate {
        let mut me = *y;
        me.set_r(y.r() / self.length);
        me.set_v(y.v() / self.velocity);
        me.set_m(y.m() / self.mass);
        me.set_dv(y.dv() / self.velocity);
        me
    }

    /// Inverse of [`Scale::normalize`]
    pub fn dimensionalize(&self, y: &StateCostate) -> StateCostate {
        let mut me = *y;
        me.set_r(y.r() * self.length);
        me.set_v(y.v() * self.velocity);
        me.set_m(y.m() * self.mass);
        me.set_dv(y.dv() * self.velocity);
        me
    }
}

impl ConfigRepr for Scale {}
