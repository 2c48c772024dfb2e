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

//! Exact two-body propagation with Shepperd's universal variable method.
//!
//! Reference: S. W. Shepperd, "Universal Keplerian state transition matrix", Celestial Mechanics 35 (1985).
//! The time equation is solved in the universal variable `u` with a safeguarded Newton iteration, and
//! Shepperd's `G(q)` function (the hypergeometric function 2F1(5, 1; 7/2; q)) is evaluated with a continued fraction.

use std::f64::consts::PI;

use crate::linalg::{Matrix2, Matrix3x2, Matrix6, M3, V3};
use crate::utils::V3Ext;
use snafu::prelude::*;

/// Errors of the universal variable two-body propagator.
#[derive(Copy, Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum KeplerError {
    #[snafu(display("gravitational parameter must be strictly positive, got {mu}"))]
    InvalidMu { mu: f64 },
    #[snafu(display("initial position has zero magnitude"))]
    Degenerate,
    #[snafu(display("{input} is not finite"))]
    NonFinite { input: &'static str },
    #[snafu(display(
        "universal variable did not converge after {iterations} iterations (u = {last_u}, time residual = {residual:e})"
    ))]
    MaxIterations {
        iterations: usize,
        last_u: f64,
        residual: f64,
    },
    #[snafu(display("continued fraction did not converge for q = {q} after {terms} terms (last value {last})"))]
    ContinuedFraction { q: f64, terms: usize, last: f64 },
}

/// Maximum number of universal variable iterations.
pub const SHEPPERD_MAX_ITER: usize = 50;
/// Relative tolerance on the time of flight residual.
pub const SHEPPERD_TIME_TOL: f64 = 1e-12;
/// Safety cap on the number of terms of the continued fraction. The number of terms needed grows like
/// `(1 - q)^(-1/2)`, so highly eccentric orbits near apoapsis need several thousand.
const CF_MAX_TERMS: usize = 1_000_000;

/// The propagated state along with the four 3x3 blocks of the state transition matrix, such that
/// `[dr_f; dv_f] = [[rr, rv], [vr, vv]] * [dr_i; dv_i]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeplerStm {
    pub r: V3,
    pub v: V3,
    pub rr: M3,
    pub rv: M3,
    pub vr: M3,
    pub vv: M3,
}

impl KeplerStm {
    /// Assembles the 6x6 state transition matrix.
    pub fn phi(&self) -> Matrix6<f64> {
        let mut phi = Matrix6::zeros();
        phi.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rr);
        phi.fixed_view_mut::<3, 3>(0, 3).copy_from(&self.rv);
        phi.fixed_view_mut::<3, 3>(3, 0).copy_from(&self.vr);
        phi.fixed_view_mut::<3, 3>(3, 3).copy_from(&self.vv);
        phi
    }
}

/// Converged universal functions, shared by the state and STM computations.
pub(crate) struct Universal {
    r0: f64,
    r: f64,
    u: f64,
    u0: f64,
    u1: f64,
    u2: f64,
    // Shepperd's U, which includes the whole revolutions
    big_u: f64,
}

impl Universal {
    /// Returns the Lagrange coefficients (f, g, F, G).
    fn lagrange(&self, mu: f64, n0: f64) -> (f64, f64, f64, f64) {
        let f = 1.0 - mu / self.r0 * self.u2;
        let g = self.r0 * self.u1 + n0 * self.u2;
        let f_dot = -mu * self.u1 / (self.r * self.r0);
        let g_dot = 1.0 - mu / self.r * self.u2;
        (f, g, f_dot, g_dot)
    }
}

/// Evaluates Shepperd's G(q) = 2F1(5, 1; 7/2; q) with its continued fraction, until the value stops changing.
/// Converges for q < 1.
pub(crate) fn g_cf(q: f64, max_terms: usize) -> Result<f64, KeplerError> {
    let mut n = 0.0;
    let mut k = -9.0;
    let mut d = 15.0;
    let mut l = 3.0;
    let mut a = 1.0;
    let mut b = 1.0;
    let mut g = 1.0;

    for _ in 0..max_terms {
        let g_old = g;
        k = -k;
        l += 2.0;
        d += 4.0 * l;
        n += (1.0 + k) * l;
        a = d / (d - n * a * q);
        b *= a - 1.0;
        g += b;
        if g == g_old {
            return Ok(g);
        }
    }

    error!("continued fraction did not converge for q = {q} after {max_terms} terms");
    ContinuedFractionSnafu {
        q,
        terms: max_terms,
        last: g,
    }
    .fail()
}

fn validate(mu: f64, tau: f64, r0: &V3, v0: &V3) -> Result<(), KeplerError> {
    ensure!(mu.is_finite(), NonFiniteSnafu { input: "mu" });
    ensure!(mu > 0.0, InvalidMuSnafu { mu });
    ensure!(tau.is_finite(), NonFiniteSnafu { input: "time of flight" });
    ensure!(V3Ext::is_finite(r0), NonFiniteSnafu { input: "position" });
    ensure!(V3Ext::is_finite(v0), NonFiniteSnafu { input: "velocity" });
    ensure!(r0.norm() > 0.0, DegenerateSnafu);
    Ok(())
}

/// Solves the universal time equation `t(u) = r0 U1 + n0 U2 + mu U3 = tau` in at most `max_iter` iterations.
pub(crate) fn solve_universal(
    mu: f64,
    tau: f64,
    ri: &V3,
    vi: &V3,
    max_iter: usize,
    max_terms: usize,
) -> Result<Universal, KeplerError> {
    let r0 = ri.norm();
    let n0 = ri.dot(vi);
    let beta = 2.0 * mu / r0 - vi.norm_squared();

    // Whole periods are folded into U so that the iteration lands on the right revolution
    let mut delta_u = 0.0;
    if beta > 0.0 {
        let period = 2.0 * PI * mu * beta.powf(-1.5);
        let norb = ((tau + 0.5 * period - 2.0 * n0 / beta) / period).floor();
        delta_u = 2.0 * PI * norb * beta.powf(-2.5);
    }

    let mut u = 0.0;
    let (mut u_min, mut u_max) = if beta < 0.0 {
        // q = beta u^2 / (1 + beta u^2) must stay below one
        let bound = 1.0 / (-beta).sqrt();
        (-bound, bound)
    } else {
        (f64::NEG_INFINITY, f64::INFINITY)
    };

    let mut prev_t = f64::NAN;
    let mut prev_u = f64::NAN;
    let mut t_err = f64::NAN;

    for iteration in 0..max_iter {
        let bu2 = beta * u * u;
        let q = bu2 / (1.0 + bu2);
        let u0w2 = 1.0 - 2.0 * q;
        let u1w2 = 2.0 * (1.0 - q) * u;

        let big_u = 16.0 / 15.0 * u1w2.powi(5) * g_cf(q, max_terms)? + delta_u;
        let u0 = 2.0 * u0w2 * u0w2 - 1.0;
        let u1 = 2.0 * u0w2 * u1w2;
        let u2 = 2.0 * u1w2 * u1w2;
        let u3 = beta * big_u + u1 * u2 / 3.0;

        let r = r0 * u0 + n0 * u1 + mu * u2;
        let t = r0 * u1 + n0 * u2 + mu * u3;
        t_err = t - tau;

        if t_err.abs() < SHEPPERD_TIME_TOL * tau.abs().max(1.0) || t == prev_t || u == prev_u {
            trace!("universal variable converged in {iteration} iterations (u = {u}, dt = {t_err:e})");
            return Ok(Universal {
                r0,
                r,
                u,
                u0,
                u1,
                u2,
                big_u,
            });
        }

        if t_err < 0.0 {
            u_min = u;
        } else {
            u_max = u;
        }

        // dt/du = 4 r (1 - q)
        let mut u_next = u - t_err / (4.0 * r * (1.0 - q));
        if !(u_next > u_min && u_next < u_max) {
            u_next = if u_min.is_finite() && u_max.is_finite() {
                0.5 * (u_min + u_max)
            } else if u_next <= u_min {
                0.5 * (u + u_min)
            } else {
                0.5 * (u + u_max)
            };
        }

        prev_u = u;
        prev_t = t;
        u = u_next;
    }

    // prev_u is the last evaluated iterate, the one t_err refers to
    error!("Shepperd's method did not converge after {max_iter} iterations: u = {prev_u}, dt = {t_err:e}");
    Err(KeplerError::MaxIterations {
        iterations: max_iter,
        last_u: prev_u,
        residual: t_err,
    })
}

/// Propagates the position and velocity by `tau` (which may be negative) around a central body of
/// gravitational parameter `mu`, for any conic.
pub fn shepperd(mu: f64, tau: f64, ri: V3, vi: V3) -> Result<(V3, V3), KeplerError> {
    validate(mu, tau, &ri, &vi)?;
    if tau == 0.0 {
        return Ok((ri, vi));
    }

    let uv = solve_universal(mu, tau, &ri, &vi, SHEPPERD_MAX_ITER, CF_MAX_TERMS)?;
    let (f, g, f_dot, g_dot) = uv.lagrange(mu, ri.dot(&vi));

    Ok((f * ri + g * vi, f_dot * ri + g_dot * vi))
}

/// Propagates the state like [`shepperd`] and also returns the state transition matrix of the propagation.
pub fn shepperd_stm(mu: f64, tau: f64, ri: V3, vi: V3) -> Result<KeplerStm, KeplerError> {
    validate(mu, tau, &ri, &vi)?;
    if tau == 0.0 {
        return Ok(KeplerStm {
            r: ri,
            v: vi,
            rr: M3::identity(),
            rv: M3::zeros(),
            vr: M3::zeros(),
            vv: M3::identity(),
        });
    }

    let n0 = ri.dot(&vi);
    let uv = solve_universal(mu, tau, &ri, &vi, SHEPPERD_MAX_ITER, CF_MAX_TERMS)?;
    let (f, g, f_dot, g_dot) = uv.lagrange(mu, n0);

    let rf = f * ri + g * vi;
    let vf = f_dot * ri + g_dot * vi;

    let (r0, r) = (uv.r0, uv.r);
    let w = g * uv.u2 + 3.0 * mu * uv.big_u;
    let a0 = mu / r0.powi(3);
    let a1 = mu / r.powi(3);

    let m = [
        [
            f_dot * (uv.u0 / (r * r0) + 1.0 / (r0 * r0) + 1.0 / (r * r)) - a0 * a1 * w,
            f_dot * uv.u1 / r + (g_dot - 1.0) / (r * r),
            (g_dot - 1.0) * uv.u1 / r - a1 * w,
        ],
        [
            -f_dot * uv.u1 / r0 - (f - 1.0) / (r0 * r0),
            -f_dot * uv.u2,
            -(g_dot - 1.0) * uv.u2,
        ],
        [
            (f - 1.0) * uv.u1 / r0 - a0 * w,
            (f - 1.0) * uv.u2,
            g * uv.u2 - w,
        ],
    ];
    let block = |i: usize, j: usize| Matrix2::new(m[i][j], m[i][j + 1], m[i + 1][j], m[i + 1][j + 1]);

    let final_basis = Matrix3x2::from_columns(&[rf, vf]);
    let init_basis_t = Matrix3x2::from_columns(&[ri, vi]).transpose();
    let eye = M3::identity();

    trace!("Shepperd STM computed with u = {}", uv.u);

    Ok(KeplerStm {
        r: rf,
        v: vf,
        rr: f * eye + final_basis * block(1, 0) * init_basis_t,
        rv: g * eye + final_basis * block(1, 1) * init_basis_t,
        vr: f_dot * eye - final_basis * block(0, 0) * init_basis_t,
        vv: g_dot * eye - final_basis * block(0, 1) * init_basis_t,
    })
}
