//! Geometry: haversine distance, neighborhood lookup and coordinate jitter

mod jitter;
mod lookup;

pub use jitter::*;
pub use lookup::*;

use crate::config::defaults::EARTH_RADIUS_KM;
use crate::types::GeoPoint;

/// Great-circle distance in km, rounded to one decimal place.
///
/// Every threshold comparison in the advisor uses this rounded value, so the
/// radius and the rounding are part of the contract.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    round_km(raw_haversine_km(a, b))
}

/// Unrounded great-circle distance in km.
pub fn raw_haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Round a distance to 0.1 km.
pub fn round_km(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}
