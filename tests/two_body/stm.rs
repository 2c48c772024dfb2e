extern crate pvg_core as pvg;

use pvg::linalg::{Matrix6, Vector6};
use pvg::propagators::{shepperd, shepperd_stm};
use pvg::V3;
use rstest::*;

// Compares the analytical state transition matrix with central finite differences of the propagator.

fn propagate_vec(mu: f64, tau: f64, x: &Vector6<f64>) -> Vector6<f64> {
    let r = x.fixed_rows::<3>(0).into_owned();
    let v = x.fixed_rows::<3>(3).into_owned();
    let (rf, vf) = shepperd(mu, tau, r, v).unwrap();
    Vector6::new(rf.x, rf.y, rf.z, vf.x, vf.y, vf.z)
}

fn finite_diff_stm(mu: f64, tau: f64, r0: V3, v0: V3, h: f64) -> Matrix6<f64> {
    let x0 = Vector6::new(r0.x, r0.y, r0.z, v0.x, v0.y, v0.z);
    let mut phi = Matrix6::zeros();
    for j in 0..6 {
        let mut xp = x0;
        xp[j] += h;
        let mut xm = x0;
        xm[j] -= h;
        let col = (propagate_vec(mu, tau, &xp) - propagate_vec(mu, tau, &xm)) / (2.0 * h);
        phi.set_column(j, &col);
    }
    phi
}

#[rstest]
#[case::circular(std::f64::consts::TAU, V3::x(), V3::y())]
#[case::elliptic(0.7, V3::new(1.0, 0.2, 0.1), V3::new(-0.1, 1.1, 0.3))]
#[case::elliptic_backward(-0.7, V3::new(1.0, 0.2, 0.1), V3::new(-0.1, 1.1, 0.3))]
#[case::elliptic_many_revs(25.0, V3::new(1.0, 0.2, 0.1), V3::new(-0.1, 1.1, 0.3))]
#[case::hyperbolic(3.0, V3::x(), V3::new(0.0, 1.6, 0.2))]
#[case::parabolic(3.0, V3::x(), V3::new(0.0, 2f64.sqrt(), 0.0))]
fn stm_vs_finite_differences(#[case] tau: f64, #[case] r0: V3, #[case] v0: V3) {
    let stm = shepperd_stm(1.0, tau, r0, v0).unwrap();

    // Same state as the plain propagator
    let (r, v) = shepperd(1.0, tau, r0, v0).unwrap();
    assert!((stm.r - r).norm() < 1e-14 * r.norm().max(1.0));
    assert!((stm.v - v).norm() < 1e-14 * v.norm().max(1.0));

    let phi = stm.phi();
    let fd = finite_diff_stm(1.0, tau, r0, v0, 1e-6);
    let err = (phi - fd).abs().max() / phi.abs().max().max(1.0);
    println!("tau = {tau}\terr = {err:e}");
    assert!(err < 1e-6, "STM error {err:e}\n{phi}\n{fd}");
}

#[test]
fn stm_first_order() {
    let r0 = V3::new(1.0, 0.2, 0.1);
    let v0 = V3::new(-0.1, 1.1, 0.3);
    let tau = 1.5;
    let stm = shepperd_stm(1.0, tau, r0, v0).unwrap();

    let dr = V3::new(1e-6, -2e-6, 0.5e-6);
    let dv = V3::new(-1e-6, 0.3e-6, 2e-6);
    let (rp, vp) = shepperd(1.0, tau, r0 + dr, v0 + dv).unwrap();
    let lin_r = stm.rr * dr + stm.rv * dv;
    let lin_v = stm.vr * dr + stm.vv * dv;
    // Only the second order residual remains, which is about a million times smaller than the perturbation
    assert!((rp - stm.r).norm() > 1e-6);
    assert!(((rp - stm.r) - lin_r).norm() < 1e-10);
    assert!(((vp - stm.v) - lin_v).norm() < 1e-10);
}

#[test]
fn stm_is_symplectic() {
    let stm = shepperd_stm(1.0, 4.2, V3::new(1.0, 0.2, 0.1), V3::new(-0.1, 1.1, 0.3)).unwrap();
    let phi = stm.phi();
    let mut j = Matrix6::zeros();
    j.fixed_view_mut::<3, 3>(0, 3).copy_from(&pvg::M3::identity());
    j.fixed_view_mut::<3, 3>(3, 0).copy_from(&(-pvg::M3::identity()));
    let err = (phi.transpose() * j * phi - j).abs().max();
    assert!(err < 1e-10, "{err:e}");
}
