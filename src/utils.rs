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

use crate::linalg::{M3, V3};

/// Squared distance under which two vectors compare equal with [`V3Ext::approx_eq`].
pub const V3_EQ_TOLERANCE: f64 = 2.0 * f64::EPSILON;

/// Extensions to the three dimensional vector used by the guidance core.
pub trait V3Ext: Sized {
    /// Returns true if the squared distance between both vectors is at most twice the machine epsilon.
    /// The root finders rely on this tolerance to detect that their iterate stopped moving.
    fn approx_eq(&self, other: &Self) -> bool;

    /// Normalizes this vector after scaling it by its largest absolute component, so that neither tiny
    /// nor huge vectors overflow or underflow when squared. The zero vector stays the zero vector.
    fn safe_normalize(&self) -> Self;

    /// Returns the spherical coordinates (r, theta, phi), with theta the polar angle from +Z in [0, pi]
    /// and phi the azimuth from +X, in (-pi, pi].
    fn to_spherical(&self) -> (f64, f64, f64);

    /// Builds a Cartesian vector from spherical coordinates, inverse of [`V3Ext::to_spherical`].
    fn from_spherical(r: f64, theta: f64, phi: f64) -> Self;

    /// Largest absolute component
    fn max_abs(&self) -> f64;

    /// Returns true if all of the components are finite
    fn is_finite(&self) -> bool;
}

impl V3Ext for V3 {
    fn approx_eq(&self, other: &Self) -> bool {
        (self - other).norm_squared() <= V3_EQ_TOLERANCE
    }

    fn safe_normalize(&self) -> Self {
        let scale = self.max_abs();
        if scale == 0.0 {
            return V3::zeros();
        }
        let scaled = self / scale;
        scaled / scaled.norm()
    }

    fn to_spherical(&self) -> (f64, f64, f64) {
        let r = self.norm();
        if r == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let theta = (self.z / r).clamp(-1.0, 1.0).acos();
        let phi = self.y.atan2(self.x);
        (r, theta, phi)
    }

    fn from_spherical(r: f64, theta: f64, phi: f64) -> Self {
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        V3::new(r * st * cp, r * st * sp, r * ct)
    }

    fn max_abs(&self) -> f64 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|c| c.is_finite())
    }
}

/// Extensions to the three by three matrix.
pub trait M3Ext: Sized {
    /// Closed form cofactor inverse, without pivoting. Returns None only if the determinant is exactly zero,
    /// so nearly singular matrices will return a poorly conditioned inverse.
    fn cofactor_inverse(&self) -> Option<Self>;
}

impl M3Ext for M3 {
    fn cofactor_inverse(&self) -> Option<Self> {
        let m = self;
        let c00 = m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)];
        let c01 = m[(1, 2)] * m[(2, 0)] - m[(1, 0)] * m[(2, 2)];
        let c02 = m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)];
        let det = m[(0, 0)] * c00 + m[(0, 1)] * c01 + m[(0, 2)] * c02;
        if det == 0.0 {
            return None;
        }
        let inv = M3::new(
            c00,
            m[(0, 2)] * m[(2, 1)] - m[(0, 1)] * m[(2, 2)],
            m[(0, 1)] * m[(1, 2)] - m[(0, 2)] * m[(1, 1)],
            c01,
            m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)],
            m[(0, 2)] * m[(1, 0)] - m[(0, 0)] * m[(1, 2)],
            c02,
            m[(0, 1)] * m[(2, 0)] - m[(0, 0)] * m[(2, 1)],
            m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        );
        Some(inv / det)
    }
}
