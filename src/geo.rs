// src/geo.rs
//! Great-circle distance between fixes

use crate::location::LocationFix;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two fixes.
pub fn haversine_distance(from: &LocationFix, to: &LocationFix) -> f64 {
    haversine_meters(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Haversine distance in meters between two latitude/longitude pairs in degrees.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Distance from the anchor to `fix`, or zero when there is no anchor yet.
///
/// Non-finite results also collapse to zero.
pub fn distance_from_anchor(anchor: Option<&LocationFix>, fix: &LocationFix) -> f64 {
    match anchor {
        Some(anchor) => {
            let d = haversine_distance(anchor, fix);
            if d.is_finite() {
                d
            } else {
                0.0
            }
        }
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, lon: f64) -> LocationFix {
        LocationFix::new(lat, lon, 0)
    }

    #[test]
    fn test_same_point_is_zero() {
        let a = fix(-22.9068, -43.1729);
        assert_eq!(haversine_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = fix(48.117, 11.517);
        let b = fix(48.2, 11.6);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn test_equator_hundredth_degree() {
        let d = haversine_distance(&fix(0.0, 0.0), &fix(0.0, 0.01));
        assert!((d - 1113.2).abs() < 11.1, "got {}", d);
    }

    #[test]
    fn test_one_degree_latitude() {
        // ~111.19 km on a 6371 km sphere
        let d = haversine_meters(10.0, 20.0, 11.0, 20.0);
        assert!((d - 111_195.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_antipodes_do_not_blow_up() {
        let d = haversine_meters(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }

    #[test]
    fn test_missing_anchor_is_zero() {
        assert_eq!(distance_from_anchor(None, &fix(45.0, 7.0)), 0.0);
    }

    #[test]
    fn test_anchor_distance() {
        let a = fix(0.0, 0.0);
        let d = distance_from_anchor(Some(&a), &fix(0.0, 0.01));
        assert!(d > 1100.0 && d < 1125.0);
    }
}
