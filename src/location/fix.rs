// src/location/fix.rs
//! Location fix value delivered by a location service

use crate::error::{Result, TrackerError};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single GPS sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_meters: Option<f64>,
    pub speed_meters_per_second: Option<f64>,
    pub timestamp_millis: i64,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, timestamp_millis: i64) -> Self {
        Self {
            latitude,
            longitude,
            altitude_meters: None,
            speed_meters_per_second: None,
            timestamp_millis,
        }
    }

    pub fn with_altitude(mut self, meters: f64) -> Self {
        self.altitude_meters = Some(meters);
        self
    }

    pub fn with_speed(mut self, meters_per_second: f64) -> Self {
        self.speed_meters_per_second = Some(meters_per_second);
        self
    }

    /// Fix timestamp as a UTC date, if it is representable
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp_millis).single()
    }

    /// Reject coordinates no receiver could legitimately report.
    ///
    /// Called at the producer boundary; the trip engine trusts anything
    /// that made it past this check.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(TrackerError::InvalidFix(format!(
                "latitude {} out of range",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(TrackerError::InvalidFix(format!(
                "longitude {} out of range",
                self.longitude
            )));
        }
        if let Some(speed) = self.speed_meters_per_second {
            if !speed.is_finite() {
                return Err(TrackerError::InvalidFix("speed is not a number".to_string()));
            }
        }
        if let Some(alt) = self.altitude_meters {
            if !alt.is_finite() {
                return Err(TrackerError::InvalidFix("altitude is not a number".to_string()));
            }
        }
        Ok(())
    }
}

/// What a location service hands to its consumer: a fix, or a delivery
/// failure in place of one.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationUpdate {
    Fix(LocationFix),
    Error(String),
}

impl From<LocationFix> for LocationUpdate {
    fn from(fix: LocationFix) -> Self {
        LocationUpdate::Fix(fix)
    }
}
