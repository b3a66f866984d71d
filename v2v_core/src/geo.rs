//! Geo-kinematic primitives: great-circle distance and initial bearing.
//!
//! All angles are degrees, all distances meters. NaN inputs propagate NaN;
//! callers validate before calling.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two coordinates, in meters.
///
/// Symmetric, non-negative, and zero (to floating precision) iff the
/// points are identical.
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing from point 1 to point 2, in degrees [0, 360).
///
/// 0 = north, 90 = east. Returns 0 when the points coincide (the direction
/// is undefined there).
pub fn bearing_degrees(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    if lat1 == lat2 && lng1 == lng2 {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Planar velocity components (east, north) in km/h for a given speed and
/// heading. Used by the risk analyzer to form relative velocities.
pub fn velocity_kmh(speed_kmh: f64, heading_deg: f64) -> (f64, f64) {
    let theta = heading_deg.to_radians();
    (speed_kmh * theta.sin(), speed_kmh * theta.cos())
}
