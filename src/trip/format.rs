// src/trip/format.rs
//! Metric display formatting

/// Meters below one kilometer, kilometers with two decimals above
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

pub fn format_speed(meters_per_second: f64) -> String {
    format!("{:.2} m/s", meters_per_second)
}

pub fn format_altitude(meters: f64) -> String {
    format!("{:.0} m", meters)
}

/// Coordinate for display
pub fn format_coordinate(coord: Option<f64>) -> String {
    match coord {
        Some(val) => format!("{:.6}°", val),
        None => "No fix".to_string(),
    }
}
