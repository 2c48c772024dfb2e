extern crate pvg_core as pvg;

use pvg::propagators::shepperd;
use pvg::{KeplerError, V3};
use rstest::*;
use std::f64::consts::{PI, TAU};

use super::MU_EARTH_KM3_S2;

fn rel_err(a: V3, b: V3) -> f64 {
    (a - b).norm() / b.norm()
}

#[test]
fn circular_full_period() {
    let (r, v) = shepperd(1.0, TAU, V3::x(), V3::y()).unwrap();
    assert!((r - V3::x()).norm() < 1e-9, "r = {r}");
    assert!((v - V3::y()).norm() < 1e-9, "v = {v}");

    // And a quarter of it
    let (r, v) = shepperd(1.0, PI / 2.0, V3::x(), V3::y()).unwrap();
    assert!((r - V3::y()).norm() < 1e-9);
    assert!((v + V3::x()).norm() < 1e-9);
}

#[rstest]
#[case::elliptic(1.0, 0.7, V3::new(1.0, 0.2, 0.1), V3::new(-0.1, 1.1, 0.3))]
#[case::elliptic_backward(1.0, -0.7, V3::new(1.0, 0.2, 0.1), V3::new(-0.1, 1.1, 0.3))]
#[case::elliptic_many_revs(1.0, 25.0, V3::new(1.0, 0.2, 0.1), V3::new(-0.1, 1.1, 0.3))]
#[case::hyperbolic(1.0, 3.0, V3::new(1.0, 0.0, 0.0), V3::new(0.0, 1.6, 0.2))]
#[case::parabolic(1.0, 3.0, V3::new(1.0, 0.0, 0.0), V3::new(0.0, 2f64.sqrt(), 0.0))]
#[case::fast_hyperbolic(1.0, 2.0, V3::new(1.0, 0.0, 0.0), V3::new(0.3, 2.5, 0.0))]
#[case::leo(3.986004418e14, 5400.0, V3::new(6778e3, 0.0, 0.0), V3::new(0.0, 7668.6, 100.0))]
fn round_trip(#[case] mu: f64, #[case] tau: f64, #[case] r0: V3, #[case] v0: V3) {
    let (rf, vf) = shepperd(mu, tau, r0, v0).unwrap();
    let (rb, vb) = shepperd(mu, -tau, rf, vf).unwrap();
    assert!(rel_err(rb, r0) < 1e-8, "{}", rel_err(rb, r0));
    assert!(rel_err(vb, v0) < 1e-8, "{}", rel_err(vb, v0));

    // Energy and angular momentum are conserved
    let energy = |r: V3, v: V3| 0.5 * v.norm_squared() - mu / r.norm();
    let e0 = energy(r0, v0);
    assert!((energy(rf, vf) - e0).abs() <= 1e-9 * e0.abs().max(v0.norm_squared()));
    assert!(rel_err(rf.cross(&vf), r0.cross(&v0)) < 1e-9);
}

#[test]
fn highly_eccentric_near_apoapsis() {
    // Eccentricity of 0.9985 and a period of about 20.5: near apoapsis, q gets within 1e-3 of one and
    // the continued fraction needs over a thousand terms.
    let r0 = V3::new(0.854, 0.336, 1.491);
    let v0 = V3::new(0.374, 0.193, 0.715);
    for i in 1..400 {
        let tau = 0.05 * f64::from(i);
        let (rf, vf) = shepperd(1.0, tau, r0, v0).unwrap_or_else(|e| panic!("tau = {tau}: {e}"));
        let (rb, vb) = shepperd(1.0, -tau, rf, vf).unwrap_or_else(|e| panic!("tau = {tau}: {e}"));
        assert!(rel_err(rb, r0) < 1e-9, "tau = {tau}: {}", rel_err(rb, r0));
        assert!(rel_err(vb, v0) < 1e-9, "tau = {tau}: {}", rel_err(vb, v0));
    }

    let (rf, _) = shepperd(1.0, 16.665, r0, v0).unwrap();
    assert!((rf - V3::new(1.093_364_876_322_908_5, 0.722_973_540_978_664_4, 2.305_026_439_664_418)).norm() < 1e-9);
}

#[test]
fn leo_regression() {
    let (r, v) = shepperd(
        3.986004418e14,
        5400.0,
        V3::new(6778e3, 0.0, 0.0),
        V3::new(0.0, 7668.6, 100.0),
    )
    .unwrap();
    assert!((r - V3::new(6_674_316.761_223_018, -1_181_003.184_408_247_5, -15_400.505_756_047_4)).norm() < 1e-3);
    assert!((v - V3::new(1_336.191_061_679_3, 7_551.293_518_760_6, 98.470_301_212_2)).norm() < 1e-6);
}

#[test]
fn vallado_kepler() {
    // Vallado, example 2-4: propagate a state by 40 minutes
    let r0 = V3::new(1131.340, -2282.343, 6672.423);
    let v0 = V3::new(-5.64305, 4.30333, 2.42879);
    let (r, v) = shepperd(MU_EARTH_KM3_S2, 40.0 * 60.0, r0, v0).unwrap();
    assert!((r - V3::new(-4219.7527, 4363.0292, -3958.7666)).norm() < 1e-2, "r = {r}");
    assert!((v - V3::new(3.689866, -1.916735, -6.112511)).norm() < 1e-5, "v = {v}");
}

#[test]
fn invalid_inputs() {
    assert!(matches!(
        shepperd(0.0, 1.0, V3::x(), V3::y()),
        Err(KeplerError::InvalidMu { .. })
    ));
    assert!(matches!(
        shepperd(1.0, f64::NAN, V3::x(), V3::y()),
        Err(KeplerError::NonFinite { .. })
    ));
    assert!(matches!(
        shepperd(1.0, 1.0, V3::zeros(), V3::y()),
        Err(KeplerError::Degenerate)
    ));
}
