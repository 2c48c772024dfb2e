extern crate pvg_core as pvg;

use pvg::tools::roots::{brent, brent_bracketed, newton, DEFAULT_MAX_ITER};
use pvg::RootError;
use rstest::*;

const TOL: f64 = 1e-12;

#[rstest]
#[case::cubic(|x: f64| x.powi(3) - 2.0 * x - 5.0, |x: f64| 3.0 * x * x - 2.0, 2.0, 3.0)]
#[case::kepler(|e: f64| e - 0.8 * e.sin() - 1.0, |e: f64| 1.0 - 0.8 * e.cos(), 0.0, std::f64::consts::PI)]
#[case::fixed_point(|x: f64| x.cos() - x, |x: f64| -x.sin() - 1.0, 0.0, 1.0)]
#[case::exponential(|x: f64| x.exp() - 2.0, |x: f64| x.exp(), -3.0, 5.0)]
#[case::flat_tail(|x: f64| (x - 0.3).powi(3), |x: f64| 3.0 * (x - 0.3).powi(2), -1.0, 2.0)]
fn bracketing_guarantee(
    #[case] f: fn(f64) -> f64,
    #[case] df: fn(f64) -> f64,
    #[case] a: f64,
    #[case] b: f64,
) {
    let x = brent_bracketed(f, a, b, TOL, DEFAULT_MAX_ITER, 0).unwrap();
    assert!(x >= a && x <= b);
    assert!(f(x).abs() < 1e-10, "brent: f({x}) = {}", f(x));

    let x = newton(|x| (f(x), df(x)), a, b, TOL, DEFAULT_MAX_ITER).unwrap();
    assert!(x >= a && x <= b);
    assert!(f(x).abs() < 1e-10, "newton: f({x}) = {}", f(x));

    // Auto bracketing from the middle of the interval
    let x = brent(f, 0.5 * (a + b), TOL, DEFAULT_MAX_ITER, 0).unwrap();
    assert!(f(x).abs() < 1e-10, "auto brent: f({x}) = {}", f(x));
}

#[test]
fn periapsis_never_below_target() {
    // Apoapsis at unit radius: the tangential speed sets the periapsis radius of the orbit
    let periapsis = |v: f64| v * v / (2.0 - v * v);
    let target: f64 = 0.8;
    let exact = (2.0 * target / (1.0 + target)).sqrt();

    let v = brent_bracketed(|v| periapsis(v) - target, 0.5, 1.0, 1e-6, DEFAULT_MAX_ITER, 1).unwrap();
    assert!(periapsis(v) >= target);
    assert!((v - exact).abs() < 2e-6);

    let v = brent_bracketed(|v| periapsis(v) - target, 0.5, 1.0, 1e-6, DEFAULT_MAX_ITER, -1).unwrap();
    assert!(periapsis(v) <= target);
    assert!((v - exact).abs() < 2e-6);
}

#[test]
fn reported_failures() {
    assert!(matches!(
        brent_bracketed(|x| x * x + 1.0, -1.0, 1.0, TOL, DEFAULT_MAX_ITER, 0),
        Err(RootError::NotBracketed { .. })
    ));
    assert!(matches!(
        newton(|x| (x * x + 1.0, 2.0 * x), -1.0, 1.0, TOL, DEFAULT_MAX_ITER),
        Err(RootError::NotBracketed { .. })
    ));
    assert!(matches!(
        brent(|x| x * x + 1.0, 0.0, TOL, 20, 0),
        Err(RootError::BracketNotFound { expansions: 20, .. })
    ));
    // Two iterations are not enough to converge
    assert!(matches!(
        brent_bracketed(|x| x.cos() - x, 0.0, 1.0, TOL, 2, 0),
        Err(RootError::MaxIterations { iterations: 2, .. })
    ));
    assert!(matches!(
        brent_bracketed(|x| if x > 0.9 { f64::NAN } else { x - 0.5 }, 0.0, 1.0, TOL, DEFAULT_MAX_ITER, 0),
        Err(RootError::NonFinite { .. })
    ));
}
