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
use crate::utils::V3Ext;
use crate::V3;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Terminal constraints of the shooting problem, in normalized units (unit gravitational parameter).
///
/// Each kind constrains part of the final orbit and completes the residuals with the transversality
/// conditions of the free final variables, so that there are as many residuals as unknown initial costates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Terminal {
    /// Radius, speed, flight path angle and inclination; the longitude of the ascending node and the
    /// argument of latitude are free.
    FlightPathAngle4Reduced { gamma: f64, rt: f64, vt: f64, inc: f64 },
    /// Semi major axis, eccentricity and inclination; the node, the argument of periapsis and the
    /// position along the orbit are free.
    Kepler3Reduced { sma: f64, ecc: f64, inc: f64 },
}

impl Terminal {
    /// Number of residuals
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        6
    }

    /// Returns the residuals of this constraint for the provided final vector. All are zero once satisfied.
    pub fn residuals(&self, yf: &StateCostate) -> Vec<f64> {
        let r = yf.r();
        let v = yf.v();
        let pv = yf.pv();
        let pr = yf.pr();
        let rmag = r.norm();
        let hvec = r.cross(&v);
        let hmag = hvec.norm();
        let hhat = hvec.safe_normalize();
        // Conjugate of the rotations of the final state
        let lvec = r.cross(&pr) + v.cross(&pv);
        let node_free = V3::z().dot(&lvec);
        let plane_free = hhat.dot(&lvec);

        match *self {
            Self::FlightPathAngle4Reduced { gamma, rt, vt, inc } => {
                let vmag = v.norm();
                vec![
                    rmag - rt,
                    vmag - vt,
                    r.dot(&v) - rmag * vmag * gamma.sin(),
                    hvec.z - hmag * inc.cos(),
                    node_free,
                    plane_free,
                ]
            }
            Self::Kepler3Reduced { sma, ecc, inc } => {
                let energy = 0.5 * v.norm_squared() - 1.0 / rmag;
                let evec = v.cross(&hvec) - r / rmag;
                vec![
                    energy + 0.5 / sma,
                    evec.norm_squared() - ecc * ecc,
                    hvec.z - hmag * inc.cos(),
                    node_free,
                    plane_free,
                    pr.dot(&v) - pv.dot(&r) / rmag.powi(3),
                ]
            }
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::FlightPathAngle4Reduced { gamma, rt, vt, inc } => write!(
                f,
                "FPA4 reduced: gamma = {gamma}, rt = {rt}, vt = {vt}, inc = {inc}"
            ),
            Self::Kepler3Reduced { sma, ecc, inc } => {
                write!(f, "Kepler3 reduced: sma = {sma}, ecc = {ecc}, inc = {inc}")
            }
        }
    }
}
