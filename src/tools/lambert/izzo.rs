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

use core::f64::consts::{LN_2, PI};

use super::{
    DegenerateGeometrySnafu, InvalidMuSnafu, InvalidTimeOfFlightSnafu, LambertError,
    LambertSolution, TransferKind, ZeroDerivativeSnafu, BATTIN_TOLERANCE, LAMBERT_EPSILON,
    LAMBERT_EPSILON_MULTI, MAX_ITERATIONS, MAX_ITERATIONS_TMIN,
};
use crate::linalg::V3;
use snafu::ensure;

/// Solve the Lambert boundary problem using Izzo's method, returning every solution branch.
///
/// This is an implementation of D. Izzo's method for solving Lambert's problem, as described in "Revisiting Lambert's problem",
/// Celestial Mechanics and Dynamical Astronomy 121 (2015).
///
/// The solutions are ordered as the zero revolution transfer first, then for each number of revolutions `n` in `1..=min(nrev, nmax)`,
/// the left branch followed by the right branch, for a total of `2 * min(nrev, nmax) + 1` solutions.
///
/// # Arguments
///
/// * `mu` - The gravitational parameter.
/// * `r_init` - The initial radius vector.
/// * `r_final` - The final radius vector.
/// * `tof` - The time of flight.
/// * `nrev` - The maximum number of complete revolutions to consider.
/// * `flip` - Set to true for motion about `-(r_init x r_final)`, i.e. transfer angles larger than 180 degrees.
pub fn izzo_all(
    mu: f64,
    r_init: V3,
    r_final: V3,
    tof: f64,
    nrev: usize,
    flip: bool,
) -> Result<Vec<LambertSolution>, LambertError> {
    ensure!(mu > 0.0 && mu.is_finite(), InvalidMuSnafu { mu });
    ensure!(tof > 0.0 && tof.is_finite(), InvalidTimeOfFlightSnafu { tof });

    let ri_norm = r_init.norm();
    let rf_norm = r_final.norm();
    ensure!(
        ri_norm > 0.0 && rf_norm > 0.0 && ri_norm.is_finite() && rf_norm.is_finite(),
        DegenerateGeometrySnafu {
            reason: "position vectors must be finite and non zero"
        }
    );

    let c_norm = (r_final - r_init).norm();

    // Semi perimeter
    let s = (ri_norm + rf_norm + c_norm) * 0.5;

    // Versors
    let i_r1 = r_init / ri_norm;
    let i_r2 = r_final / rf_norm;

    let i_h = i_r1.cross(&i_r2);
    let h_norm = i_h.norm();
    ensure!(
        h_norm > f64::EPSILON,
        DegenerateGeometrySnafu {
            reason: "position vectors are collinear, the transfer plane is undefined"
        }
    );
    let i_h = i_h / h_norm;

    // Geometry of the problem
    let mut lambda = (1.0 - c_norm / s).sqrt();

    let (i_t1, i_t2) = if flip {
        lambda = -lambda;
        (i_r1.cross(&i_h), i_r2.cross(&i_h))
    } else {
        (i_h.cross(&i_r1), i_h.cross(&i_r2))
    };

    // Non dimensional time of flight
    let t = (2.0 * mu / s.powi(3)).sqrt() * tof;

    let nmax = max_revolutions(t, lambda).min(nrev);

    let mut branches = Vec::with_capacity(2 * nmax + 1);
    branches.push(householder(
        t,
        initial_guess(t, lambda),
        0,
        LAMBERT_EPSILON,
        lambda,
        MAX_ITERATIONS,
    )?);

    for n in 1..=nmax {
        let n_pi = n as f64 * PI;

        let tmp = ((n_pi + PI) / (8.0 * t)).powf(2.0 / 3.0);
        branches.push(householder(
            t,
            (tmp - 1.0) / (tmp + 1.0),
            n,
            LAMBERT_EPSILON_MULTI,
            lambda,
            MAX_ITERATIONS,
        )?);

        let tmp = (8.0 * t / n_pi).powf(2.0 / 3.0);
        branches.push(householder(
            t,
            (tmp - 1.0) / (tmp + 1.0),
            n,
            LAMBERT_EPSILON_MULTI,
            lambda,
            MAX_ITERATIONS,
        )?);
    }

    // Reconstruct the velocities from x
    let gamma = (mu * s / 2.0).sqrt();
    let rho = (ri_norm - rf_norm) / c_norm;
    let sigma = (1.0 - rho.powi(2)).sqrt();

    Ok(branches
        .into_iter()
        .map(|(x, revs, iterations)| {
            let (v_r1, v_r2, v_t1, v_t2) = reconstruct(x, ri_norm, rf_norm, lambda, gamma, rho, sigma);
            LambertSolution {
                v_init: v_r1 * i_r1 + v_t1 * i_t1,
                v_final: v_r2 * i_r2 + v_t2 * i_t2,
                revs,
                iterations,
                x,
            }
        })
        .collect())
}

/// Solves Lambert's problem and returns the solution whose departure velocity is the closest to the reference
/// velocity `v_ref` at `r_init`.
///
/// The direction of motion is that of the reference orbit: its angular momentum `r_init x v_ref` is compared
/// to `r_init x r_final`, which avoids the ambiguity of a clockwise or counterclockwise test for near polar transfers.
pub fn izzo(
    mu: f64,
    r_init: V3,
    v_ref: V3,
    r_final: V3,
    tof: f64,
    nrev: usize,
) -> Result<LambertSolution, LambertError> {
    let flip = r_init.cross(&v_ref).dot(&r_init.cross(&r_final)) < 0.0;

    let solutions = izzo_all(mu, r_init, r_final, tof, nrev, flip)?;
    debug!(
        "Lambert found {} solutions (nrev = {nrev}, flip = {flip})",
        solutions.len()
    );

    // There is always at least the zero revolution solution
    let mut best = solutions[0];
    for sol in solutions.into_iter().skip(1) {
        if (sol.v_init - v_ref).norm_squared() < (best.v_init - v_ref).norm_squared() {
            best = sol;
        }
    }
    Ok(best)
}

/// Solves the zero revolution Lambert problem for the provided kind of transfer.
pub fn izzo_kind(
    mu: f64,
    r_init: V3,
    r_final: V3,
    tof: f64,
    kind: TransferKind,
) -> Result<LambertSolution, LambertError> {
    let solutions = izzo_all(mu, r_init, r_final, tof, 0, kind.flip(&r_init, &r_final))?;
    Ok(solutions[0])
}

/// Reconstructs solution velocity vectors.
/// Returns a tuple of (V_r1, V_r2, V_t1, V_t2).
fn reconstruct(
    x: f64,
    r1: f64,
    r2: f64,
    ll: f64,
    gamma: f64,
    rho: f64,
    sigma: f64,
) -> (f64, f64, f64, f64) {
    let y = (1.0 - ll.powi(2) + ll.powi(2) * x.powi(2)).sqrt();
    let v_r1 = gamma * ((ll * y - x) - rho * (ll * y + x)) / r1;
    let v_r2 = -gamma * ((ll * y - x) + rho * (ll * y + x)) / r2;
    // y + lambda x cancels on fast long way transfers, where y^2 - (lambda x)^2 = 1 - lambda^2
    let y_plus = if ll * x < 0.0 {
        (1.0 - ll.powi(2)) / (y - ll * x)
    } else {
        y + ll * x
    };
    let v_t = gamma * sigma * y_plus;

    (v_r1, v_r2, v_t / r1, v_t / r2)
}

/// Returns the largest number of complete revolutions for which a solution exists at this time of flight.
fn max_revolutions(t: f64, ll: f64) -> usize {
    let mut nmax = (t / PI).floor() as usize;
    let t_00 = ll.acos() + ll * (1.0 - ll.powi(2)).sqrt();
    let t_0 = t_00 + nmax as f64 * PI;

    if nmax > 0 && t < t_0 {
        // Refine the minimum time of flight of the nmax branch with Halley iterations
        let mut t_min = t_0;
        let mut x_old = 0.0;
        let mut x_new = 0.0;
        let mut it = 0;
        loop {
            let (dt, ddt, dddt) = tof_derivatives(x_old, t_min, ll);
            if dt != 0.0 {
                x_new = x_old - dt * ddt / (ddt * ddt - dt * dddt / 2.0);
            }
            if (x_old - x_new).abs() < 1e-13 {
                break;
            }
            if it > MAX_ITERATIONS_TMIN {
                debug!("minimum time of flight refinement stopped after {it} iterations");
                break;
            }
            t_min = x_to_tof(x_new, nmax, ll);
            x_old = x_new;
            it += 1;
        }
        if t_min > t {
            nmax -= 1;
        }
    }
    nmax
}

/// Calculates the initial guess of the zero revolution branch.
fn initial_guess(t: f64, ll: f64) -> f64 {
    let t_00 = ll.acos() + ll * (1.0 - ll.powi(2)).sqrt();
    let t_1 = 2.0 / 3.0 * (1.0 - ll.powi(3));

    if t >= t_00 {
        -(t - t_00) / (t - t_00 + 4.0)
    } else if t <= t_1 {
        t_1 * (t_1 - t) / (2.0 / 5.0 * (1.0 - ll.powi(5)) * t) + 1.0
    } else {
        (t / t_00).powf(LN_2 / (t_1 / t_00).ln()) - 1.0
    }
}

/// Hypergeometric function 2F1(3, 1, 5/2, x), see Battin.
fn hyp2f1b(z: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0_f64;
    let mut j = 0.0_f64;
    loop {
        term *= (3.0 + j) * (1.0 + j) / (2.5 + j) * z / (j + 1.0);
        sum += term;
        j += 1.0;
        if term.abs() <= BATTIN_TOLERANCE {
            return sum;
        }
    }
}

/// Lagrange's form of the time of flight equation
fn x_to_tof_lagrange(x: f64, n: usize, ll: f64) -> f64 {
    let a = 1.0 / (1.0 - x * x);
    if a > 0.0 {
        // Ellipse
        let alpha = 2.0 * x.acos();
        let mut beta = 2.0 * (ll * ll / a).sqrt().asin();
        if ll < 0.0 {
            beta = -beta;
        }
        a * a.sqrt() * ((alpha - alpha.sin()) - (beta - beta.sin()) + 2.0 * PI * n as f64) / 2.0
    } else {
        // Hyperbola
        let alpha = 2.0 * x.acosh();
        let mut beta = 2.0 * (-ll * ll / a).sqrt().asinh();
        if ll < 0.0 {
            beta = -beta;
        }
        -a * (-a).sqrt() * ((beta - beta.sinh()) - (alpha - alpha.sinh())) / 2.0
    }
}

/// Non dimensional time of flight as a function of x.
///
/// Lagrange's form is used at moderate distances from x = 1, Battin's series very close to x = 1, and
/// Lancaster's form elsewhere, to avoid the cancellation of each form in the others' domain.
fn x_to_tof(x: f64, n: usize, ll: f64) -> f64 {
    let dist = (x - 1.0).abs();
    if dist > 0.01 && dist < 0.2 {
        return x_to_tof_lagrange(x, n, ll);
    }

    let k = ll * ll;
    let e = x * x - 1.0;
    let rho = e.abs();
    let z = (1.0 + k * e).sqrt();

    if dist < 0.01 {
        // Battin
        let eta = z - ll * x;
        let s1 = 0.5 * (1.0 - ll - x * eta);
        let q = 4.0 / 3.0 * hyp2f1b(s1);
        (eta.powi(3) * q + 4.0 * ll * eta) / 2.0 + n as f64 * PI / rho.powf(1.5)
    } else {
        // Lancaster
        let y = rho.sqrt();
        let g = x * z - ll * e;
        let d = if e < 0.0 {
            n as f64 * PI + g.acos()
        } else {
            let f = y * (z - ll * x);
            (f + g).ln()
        };
        (x - ll * z - d / y) / e
    }
}

/// First, second, and third derivatives of the time of flight with respect to x.
fn tof_derivatives(x: f64, t: f64, ll: f64) -> (f64, f64, f64) {
    let l2 = ll * ll;
    let l3 = l2 * ll;
    let umx2 = 1.0 - x * x;
    let y = (1.0 - l2 * umx2).sqrt();
    let y2 = y * y;
    let y3 = y2 * y;
    let dt = (3.0 * t * x - 2.0 + 2.0 * l3 * x / y) / umx2;
    let ddt = (3.0 * t + 5.0 * x * dt + 2.0 * (1.0 - l2) * l3 / y3) / umx2;
    let dddt = (7.0 * x * ddt + 8.0 * dt - 6.0 * (1.0 - l2) * l2 * l3 * x / y3 / y2) / umx2;
    (dt, ddt, dddt)
}

/// Finds a zero of the time of flight equation using Householder's (third order) method.
/// Returns the converged x, the number of revolutions, and the number of iterations.
///
/// Once the update falls below `eps`, one more update is applied: on hyperbolic branches x is large and an
/// absolute tolerance of `eps` alone leaves a visible error on the velocities.
fn householder(
    t: f64,
    mut x0: f64,
    n: usize,
    eps: f64,
    ll: f64,
    max_iter: usize,
) -> Result<(f64, usize, usize), LambertError> {
    let mut converged = false;
    for it in 1..=max_iter {
        let tof = x_to_tof(x0, n, ll);
        let (dt, ddt, dddt) = tof_derivatives(x0, tof, ll);
        let delta = tof - t;
        let dt2 = dt * dt;
        let x = x0 - delta * (dt2 - delta * ddt / 2.0)
            / (dt * (dt2 - delta * ddt) + dddt * delta * delta / 6.0);

        if !x.is_finite() {
            // The extra update may hit an exact root with vanishing derivatives
            ensure!(converged, ZeroDerivativeSnafu { x: x0 });
            return Ok((x0, n, it));
        }

        let err = (x0 - x).abs();
        x0 = x;
        if converged {
            return Ok((x0, n, it));
        }
        converged = err <= eps;
    }

    if converged {
        return Ok((x0, n, max_iter));
    }

    error!("Lambert Householder iterations did not converge for {n} revolutions (x = {x0})");
    Err(LambertError::SolverMaxIter {
        maxiter: max_iter,
        last: x0,
    })
}
