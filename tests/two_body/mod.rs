/// Earth gravitational parameter in km^3/s^2, as used by Vallado
pub(crate) const MU_EARTH_KM3_S2: f64 = 3.986_004_33e5;

mod shepperd;
mod stm;
