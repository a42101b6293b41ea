//! Spherical-earth geometry shared by detection, zones and the resume decision.

use std::f64::consts::PI;

/// Mean earth radius used by every great-circle computation.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// One nautical mile in meters.
pub const NM: f64 = 1852.0;

/// One foot in meters.
pub const FT: f64 = 0.3048;

/// One knot in meters per second.
pub const KTS: f64 = NM / 3600.0;

/// Great-circle distance in meters between two positions in degrees.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial course from point 1 to point 2, radians clockwise from north.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Bearing (degrees, clockwise from north) and distance (meters) from point 1 to point 2.
pub fn qdrdist(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    (
        bearing(lat1, lon1, lat2, lon2).to_degrees(),
        haversine_distance(lat1, lon1, lat2, lon2),
    )
}

/// Position reached after flying `distance_m` along `bearing_rad` from
/// (`lat`, `lon`). Longitude is normalized to [-180, 180).
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let lon2 = (lon1 + y.atan2(x) + PI).rem_euclid(2.0 * PI) - PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// East/north displacement in meters of point 2 relative to point 1.
pub fn east_north_offset(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    let (qdr_deg, dist_m) = qdrdist(lat1, lon1, lat2, lon2);
    let qdr = qdr_deg.to_radians();
    (dist_m * qdr.sin(), dist_m * qdr.cos())
}

/// East and north velocity components (m/s) for a ground speed along a track.
pub fn track_components(gs_mps: f64, trk_deg: f64) -> (f64, f64) {
    let trk = trk_deg.to_radians();
    (gs_mps * trk.sin(), gs_mps * trk.cos())
}

/// Smallest absolute difference between two headings, in [0, 180] degrees.
pub fn heading_difference(a_deg: f64, b_deg: f64) -> f64 {
    let diff = (a_deg - b_deg).rem_euclid(360.0);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111_194.0).abs() < 100.0);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_distance(52.0, 4.0, 52.0, 4.0);
        assert!(dist < 0.001);
    }

    #[test]
    fn qdrdist_points_east_along_equator() {
        let (qdr, dist) = qdrdist(0.0, 0.0, 0.0, 0.1);
        assert!((qdr - 90.0).abs() < 1e-6);
        assert!((dist - 11_119.5).abs() < 1.0);
    }

    #[test]
    fn offset_by_bearing_round_trips_distance() {
        let (lat, lon) = offset_by_bearing(52.0, 4.0, 10.0 * NM, 45f64.to_radians());
        let dist = haversine_distance(52.0, 4.0, lat, lon);
        assert!((dist - 10.0 * NM).abs() < 0.5, "got {dist}");
    }

    #[test]
    fn heading_difference_wraps_through_north() {
        assert!((heading_difference(359.0, 1.0) - 2.0).abs() < 1e-9);
        assert!((heading_difference(90.0, 270.0) - 180.0).abs() < 1e-9);
        assert!((heading_difference(10.0, 100.0) - 90.0).abs() < 1e-9);
    }
}
