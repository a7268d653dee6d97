// src/location/filter.rs
//! Minimum distance / interval filter applied before fixes are delivered

use super::fix::LocationFix;
use crate::geo::haversine_distance;
use std::time::Duration;

pub const DEFAULT_MIN_DISTANCE_METERS: f64 = 1.0;
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Drops fixes that arrive too soon or too close to the last delivered one.
#[derive(Debug, Clone)]
pub struct UpdateFilter {
    min_distance: f64,      // Minimum distance in meters between deliveries
    min_interval: Duration, // Minimum time between deliveries
    last_delivered: Option<LocationFix>,
}

impl UpdateFilter {
    pub fn new(min_distance_meters: f64, min_interval: Duration) -> Self {
        Self {
            min_distance: min_distance_meters.max(0.0),
            min_interval,
            last_delivered: None,
        }
    }

    /// Returns true when `fix` should be delivered, and remembers it if so.
    pub fn accept(&mut self, fix: &LocationFix) -> bool {
        if let Some(last) = &self.last_delivered {
            let elapsed_ms = fix.timestamp_millis.saturating_sub(last.timestamp_millis);
            if elapsed_ms < self.min_interval.as_millis() as i64 {
                return false;
            }

            if haversine_distance(last, fix) < self.min_distance {
                return false; // Too close to last point
            }
        }

        self.last_delivered = Some(*fix);
        true
    }

    /// Forget the last delivered fix so the next one always passes
    pub fn reset(&mut self) {
        self.last_delivered = None;
    }

    pub fn min_distance_meters(&self) -> f64 {
        self.min_distance
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for UpdateFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISTANCE_METERS, DEFAULT_MIN_INTERVAL)
    }
}
