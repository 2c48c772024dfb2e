extern crate pvg_core as pvg;

use pvg::io::{ConfigError, ConfigRepr};
use pvg::propagators::{PropOpts, RSSStep};
use pvg::{Phase, PvgIntegrator, Scale, V3};

use crate::data_path;

#[test]
fn load_ascent_phases() {
    let phases = Phase::load_many(data_path("ascent_phases.yaml")).unwrap();
    assert_eq!(phases.len(), 3);
    for phase in &phases {
        phase.validate().unwrap();
    }
    assert_eq!(phases[0].bt, Some(90.0));
    assert!(phases[1].coast);
    assert_eq!(PvgIntegrator::for_phase(&phases[2]), PvgIntegrator::Analytic);

    // Matches the constructor from the specific impulse, to the precision of the file
    let lower = Phase::burn(20_000.0, 300_000.0, 320.0);
    assert!((phases[0].ve - lower.ve).abs() < 1e-3);
    assert!((phases[0].mdot - lower.mdot).abs() < 1e-4);

    let scale = Scale::new(6_571_000.0, 3.986004418e14, 20_000.0);
    let normalized: Vec<Phase> = phases.iter().map(|p| p.rescale(&scale)).collect();
    assert_eq!(normalized[0].m0, 1.0);
    assert!((normalized[0].bt.unwrap() * scale.time - 90.0).abs() < 1e-9);
}

#[test]
fn load_named_phases() {
    let phases = Phase::load_named(data_path("named_phases.yaml")).unwrap();
    assert_eq!(phases.len(), 2);
    assert!(phases["circularize"].analytic);
    let plane_change = phases["plane_change"];
    assert!(plane_change.infinite && plane_change.unguided);
    assert_eq!(plane_change.u0, V3::z());
    plane_change.validate().unwrap();
    // Infinite thrust doubles the acceleration and expels no mass
    assert_eq!(plane_change.acceleration(0.5), 1.0);
    assert_eq!(plane_change.mass_rate(), 0.0);
}

#[test]
fn load_prop_opts() {
    let opts = PropOpts::<RSSStep>::load(data_path("prop_opts.yaml")).unwrap();
    assert_eq!(opts.attempts, 40);
    assert_eq!(opts.tolerance, 1e-12);
    assert!(!opts.fixed_step);

    let round_trip = PropOpts::<RSSStep>::loads(&opts.dumps().unwrap()).unwrap();
    assert_eq!(round_trip, opts);
}

#[test]
fn config_errors() {
    assert!(matches!(
        Phase::load(data_path("does_not_exist.yaml")),
        Err(ConfigError::ReadError { .. })
    ));
    assert!(matches!(
        Phase::loads("thrust: [1.0"),
        Err(ConfigError::ParseError { .. })
    ));
    assert!(matches!(
        Phase::loads("m0: -1.0").unwrap().validate(),
        Err(ConfigError::InvalidConfig { .. })
    ));
}
