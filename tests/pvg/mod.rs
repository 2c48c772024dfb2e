use pvg_core::{StateCostate, V3};

mod integrators;
mod phases;

/// A prograde state slightly off a unit circular orbit, with a primer vector mostly along the velocity
pub(crate) fn initial_state() -> StateCostate {
    StateCostate::new(
        V3::x(),
        V3::y(),
        V3::new(0.3, 1.0, 0.1),
        V3::new(-0.2, 0.1, 0.05),
        1.0,
        1.0,
    )
}
