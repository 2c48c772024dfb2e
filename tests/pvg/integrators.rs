extern crate pvg_core as pvg;

use pvg::md::pvg::coast;
use pvg::propagators::{PropOpts, PropagationError, RSSStep};
use pvg::{Phase, PvgError, PvgIntegrator, StateCostate, V3};
use rstest::*;

use super::initial_state;

fn numeric() -> PvgIntegrator {
    PvgIntegrator::Numeric(PropOpts::with_tolerance(1e-12))
}

fn guided() -> Phase {
    Phase::builder()
        .m0(1.0)
        .thrust(0.5)
        .mdot(0.25)
        .ve(2.0)
        .normalized(true)
        .build()
}

fn rel_diff(a: &StateCostate, b: &StateCostate) -> f64 {
    // Only the state, the costates of the closed form are approximate
    let num = (a.r() - b.r()).norm() + (a.v() - b.v()).norm() + (a.m() - b.m()).abs() + (a.dv() - b.dv()).abs();
    let den = b.r().norm() + b.v().norm() + b.m().abs() + b.dv().abs();
    num / den
}

#[rstest]
#[case::guided(guided())]
#[case::infinite(guided().with_infinite())]
#[case::unguided(guided().with_unguided(V3::new(0.2, 1.0, 0.0)))]
fn analytic_matches_numeric(#[case] phase: Phase) {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
    let y0 = initial_state();
    for dt in [0.005, 0.01] {
        let closed = PvgIntegrator::Analytic.integrate(&y0, &phase, 0.0, dt).unwrap();
        let ode = numeric().integrate(&y0, &phase, 0.0, dt).unwrap();
        let err = rel_diff(&closed, &ode);
        println!("{phase} over {dt}: {err:e}");
        assert!(err < 1e-5);
        // The primer vector still agrees to first order
        assert!((closed.pv() - ode.pv()).norm() < 1e-3);
    }
}

#[test]
fn mass_and_delta_v() {
    let y0 = initial_state();
    let yf = numeric().integrate(&y0, &guided(), 0.0, 0.5).unwrap();
    assert!((yf.m() - 0.875).abs() < 1e-12);
    assert!((yf.dv() - 2.0 * (1.0f64 / 0.875).ln()).abs() < 1e-9);
    // Guided thrust along the primer vector increases the mass costate
    assert!(yf.pm() > y0.pm());

    let yf = numeric().integrate(&y0, &guided().with_infinite(), 0.0, 0.5).unwrap();
    assert_eq!(yf.m(), 1.0);
    assert!((yf.dv() - 0.5).abs() < 1e-12);
}

#[test]
fn step_above_tolerance_is_an_error() {
    // A single attempt per step cannot bring a step of two time units within the tolerance
    let opts = PropOpts::<RSSStep>::builder()
        .init_step(2.0)
        .max_step(2.0)
        .attempts(1)
        .build();
    let err = PvgIntegrator::Numeric(opts)
        .integrate(&initial_state(), &guided().with_infinite(), 0.0, 3.0)
        .unwrap_err();
    match err {
        PvgError::Propagation {
            source: PropagationError::ToleranceNotMet { t, error, tolerance, .. },
        } => {
            assert_eq!(t, 0.0);
            assert!(error > tolerance);
        }
        other => panic!("expected a tolerance error, got {other}"),
    }

    // With enough attempts, the same options integrate the phase
    let opts = PropOpts::<RSSStep>::builder().init_step(2.0).max_step(2.0).build();
    assert!(PvgIntegrator::Numeric(opts)
        .integrate(&initial_state(), &guided().with_infinite(), 0.0, 3.0)
        .is_ok());
}

#[test]
fn coast_costate_linearity() {
    let y0 = initial_state();
    let mut doubled = y0;
    doubled.set_pv(2.0 * y0.pv());
    doubled.set_pr(2.0 * y0.pr());

    let coast = Phase::coast(1.0);
    let yf = PvgIntegrator::Coast.integrate(&y0, &coast, 0.0, 2.5).unwrap();
    let yf2 = PvgIntegrator::Coast.integrate(&doubled, &coast, 0.0, 2.5).unwrap();

    assert_eq!(yf.r(), yf2.r());
    assert_eq!(yf.v(), yf2.v());
    assert!((yf2.pv() - 2.0 * yf.pv()).norm() < 1e-12 * yf.pv().norm());
    assert!((yf2.pr() - 2.0 * yf.pr()).norm() < 1e-12 * yf.pr().norm());
    assert_eq!(yf.m(), y0.m());
    assert_eq!(yf.pm(), y0.pm());
}

#[rstest]
#[case(0.3)]
#[case(2.5)]
#[case(10.0)]
fn coast_matches_numeric(#[case] dt: f64) {
    let y0 = initial_state();
    let coast = Phase::coast(1.0);
    let exact = PvgIntegrator::Coast.integrate(&y0, &coast, 0.0, dt).unwrap();
    assert_eq!(exact, coast::propagate(&y0, dt).unwrap());
    let ode = numeric().integrate(&y0, &coast, 0.0, dt).unwrap();
    let err = (exact.0 - ode.0).abs().max();
    println!("coast over {dt}: {err:e}");
    assert!(err < 1e-7);
}

#[test]
fn primer_vector_hamiltonian() {
    // Along a coast, PR.V - PV.(-R/r^3) is the Hamiltonian and must be constant
    let y0 = initial_state();
    let hamiltonian = |y: &StateCostate| y.pr().dot(&y.v()) - y.pv().dot(&y.r()) / y.rmag().powi(3);
    let h0 = hamiltonian(&y0);
    for dt in [0.5, 1.0, 4.0] {
        let yf = PvgIntegrator::Coast.integrate(&y0, &Phase::coast(1.0), 0.0, dt).unwrap();
        assert!((hamiltonian(&yf) - h0).abs() < 1e-10, "{dt}");
    }
}
