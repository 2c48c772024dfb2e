extern crate pvg_core as pvg;

use pvg::md::pvg::terminal::Terminal;
use pvg::md::pvg::{integrate_phases, INTERIOR_NODES};
use pvg::propagators::shepperd;
use pvg::{Phase, PvgError, PvgIntegrator, Scale, Solution, StateCostate, V3};
use rstest::*;

use super::initial_state;

/// Two stages separated by a coast, in SI units then normalized
fn ascent() -> (Vec<Phase>, Vec<(f64, f64)>, Scale) {
    let scale = Scale::new(6_571_000.0, 3.986004418e14, 20_000.0);
    let lower = Phase::burn(20_000.0, 300_000.0, 320.0).rescale(&scale);
    let coast = Phase::coast(12_000.0).rescale(&scale);
    let upper = Phase::burn(12_000.0, 60_000.0, 350.0).rescale(&scale);
    let phases = vec![lower, coast, upper];
    let intervals = vec![(0.0, 0.05), (0.05, 0.4), (0.4, 0.5)];
    (phases, intervals, scale)
}

#[test]
fn chained_phases_with_staging() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }
    let (phases, intervals, scale) = ascent();
    assert_eq!(phases[0].m0, 1.0);
    assert!((phases[2].m0 - 0.6).abs() < 1e-15);
    assert!(phases.iter().all(|p| p.normalized));

    let y0 = initial_state();
    let mut solution = Solution::new();
    let yf = integrate_phases(&y0, &phases, &intervals, Some(&mut solution)).unwrap();
    let yf_direct = integrate_phases(&y0, &phases, &intervals, None).unwrap();
    assert!((yf.0 - yf_direct.0).abs().max() < 1e-7, "{yf}\n{yf_direct}");

    assert_eq!(solution.len(), 3);
    assert_eq!(solution.t0(), Some(0.0));
    assert_eq!(solution.tf(), Some(0.5));
    for segment in solution.segments() {
        assert_eq!(segment.interpolant.times().len(), INTERIOR_NODES + 2);
    }

    // Staging resets the mass at the start of each phase
    assert_eq!(solution.m(0.05).unwrap(), phases[1].m0);
    assert_eq!(solution.m(0.4).unwrap(), phases[2].m0);
    let lower_burnout = solution.segments()[0].interpolant.states()[INTERIOR_NODES + 1];
    let expected = 1.0 - phases[0].mdot * 0.05;
    assert!((lower_burnout.m() - expected).abs() < 1e-12);

    // The delta-v never decreases, and the thrust follows the primer vector during the burns
    let mut prev_dv = 0.0;
    for k in 0..=100 {
        let t = 0.005 * k as f64;
        let dv = solution.dv(t).unwrap();
        assert!(dv >= prev_dv - 1e-12, "t = {t}");
        prev_dv = dv;
        let u = solution.u(t).unwrap();
        if (0.05..0.4).contains(&t) {
            assert_eq!(u, V3::zeros());
        } else {
            assert!((u - solution.pv(t).unwrap().normalize()).norm() < 1e-12);
        }
    }
    assert!((solution.dv(0.5).unwrap() - yf.dv()).abs() < 1e-12);

    // The coast segment reproduces the two-body solution between its nodes
    let start = solution.state_at(0.05).unwrap();
    let (r, v) = shepperd(1.0, 0.21, start.r(), start.v()).unwrap();
    assert!((solution.r(0.26).unwrap() - r).norm() < 1e-9);
    assert!((solution.v(0.26).unwrap() - v).norm() < 1e-9);

    // The burnout state, back in SI units
    let si = scale.dimensionalize(&yf);
    assert!((si.m() - 12_000.0 + 60_000.0 / (350.0 * 9.80665) * 0.1 * scale.time).abs() < 1e-6);
    println!("burnout: {si}");

    assert!(matches!(solution.state_at(0.6), Err(PvgError::OutOfRange { .. })));
}

#[test]
fn analytic_dense_output() {
    let phase = Phase::builder()
        .m0(1.0)
        .thrust(0.5)
        .mdot(0.25)
        .ve(2.0)
        .normalized(true)
        .analytic(true)
        .build();
    let integrator = PvgIntegrator::for_phase(&phase);
    assert_eq!(integrator, PvgIntegrator::Analytic);

    let y0 = initial_state();
    let mut solution = Solution::new();
    let yf = integrator.integrate_into(&y0, &phase, 1.0, 1.02, &mut solution).unwrap();
    let direct = integrator.integrate(&y0, &phase, 1.0, 1.02).unwrap();
    assert_eq!(yf, direct);
    assert_eq!(solution.state_at(1.02).unwrap(), yf);
    assert_eq!(solution.state_at(1.0).unwrap(), y0);

    // Appending an overlapping phase is rejected
    assert!(matches!(
        integrator.integrate_into(&yf, &phase, 1.01, 1.2, &mut solution),
        Err(PvgError::InvalidInterval { .. })
    ));
}

#[rstest]
#[case(0.05)]
#[case(0.2)]
#[case(0.5)]
fn analytic_dense_output_terminal(#[case] dt: f64) {
    let phase = Phase::builder()
        .m0(1.0)
        .thrust(0.5)
        .mdot(0.25)
        .ve(2.0)
        .normalized(true)
        .analytic(true)
        .build();
    let y0 = initial_state();

    let mut solution = Solution::new();
    let with_solution = integrate_phases(&y0, &[phase], &[(0.0, dt)], Some(&mut solution)).unwrap();
    let without = integrate_phases(&y0, &[phase], &[(0.0, dt)], None).unwrap();
    assert_eq!(with_solution, without);
    assert_eq!(solution.state_at(dt).unwrap(), without);

    // Every node is the closed form arc from the initial vector
    let segment = &solution.segments()[0];
    for (t, node) in segment.interpolant.times().iter().zip(segment.interpolant.states()) {
        let expected = PvgIntegrator::Analytic.integrate(&y0, &phase, 0.0, *t).unwrap();
        assert_eq!(*node, expected, "t = {t}");
    }
}

#[test]
fn shooting_residuals() {
    // A coast along the target circular orbit meets the terminal constraints once the costates are transversal
    let inc: f64 = 0.4;
    let v = V3::new(0.0, inc.cos(), inc.sin());
    let y0 = StateCostate::new(V3::x(), v, v, V3::x(), 1.0, 0.0);
    let terminal = Terminal::Kepler3Reduced {
        sma: 1.0,
        ecc: 0.0,
        inc,
    };
    let yf = PvgIntegrator::Coast
        .integrate(&y0, &Phase::coast(1.0), 0.0, 1.7)
        .unwrap();
    let residuals = terminal.residuals(&yf);
    assert_eq!(residuals.len(), terminal.len());
    for r in residuals {
        assert!(r.abs() < 1e-9, "{r}");
    }
}
