//! Great-circle distance

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinate;

/// Calculate the distance between two points in kilometers (Haversine formula)
///
/// Symmetric, and exactly zero for identical points.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
