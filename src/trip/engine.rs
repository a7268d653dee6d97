// src/trip/engine.rs
//! Trip metrics: distance, speed and path accumulated from location fixes

use super::stopwatch::Stopwatch;
use crate::{
    geo::distance_from_anchor,
    location::{LocationFix, LocationUpdate},
};
use tracing::debug;

/// Implied speed above which a delta is treated as a GPS glitch
pub const DEFAULT_MAX_PLAUSIBLE_SPEED_MPS: f64 = 50.0;

/// Consecutive glitch rejections after which the anchor is moved anyway
const REANCHOR_AFTER_REJECTIONS: u32 = 3;

/// Running state of one trip. `Default` is the cleared state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripState {
    pub recording: bool,
    pub last_fix: Option<LocationFix>,
    pub path: Vec<LocationFix>,
    pub distance_meters: f64,
    pub average_speed_meters_per_second: f64,
    pub current_speed_meters_per_second: f64,
    pub altitude_meters: f64,
}

/// Metrics for a finished or in-progress trip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripSummary {
    pub distance_meters: f64,
    pub elapsed_seconds: i64,
    pub average_speed_meters_per_second: f64,
    pub path_points: usize,
}

/// Consumes every fix from the location service and keeps the trip metrics.
///
/// Fixes always move the live position; they only grow the path and the
/// distance while recording.
#[derive(Debug)]
pub struct TripEngine {
    state: TripState,
    stopwatch: Stopwatch,
    position: Option<LocationFix>,
    max_plausible_speed: Option<f64>,
    rejected_in_row: u32,
}

impl TripEngine {
    pub fn new() -> Self {
        Self::with_max_plausible_speed(Some(DEFAULT_MAX_PLAUSIBLE_SPEED_MPS))
    }

    /// `None` accepts every delta, however fast it implies the rider moved.
    pub fn with_max_plausible_speed(max_plausible_speed: Option<f64>) -> Self {
        Self {
            state: TripState::default(),
            stopwatch: Stopwatch::new(),
            position: None,
            max_plausible_speed,
            rejected_in_row: 0,
        }
    }

    pub fn start_recording(&mut self) {
        if self.state.recording {
            return;
        }
        debug!("recording started");
        self.state.recording = true;
    }

    pub fn stop_recording(&mut self) {
        if !self.state.recording {
            return;
        }
        debug!("recording stopped");
        self.state.recording = false;
    }

    /// Clear the trip and stop the stopwatch.
    pub fn reset(&mut self) {
        self.state = TripState::default();
        self.rejected_in_row = 0;
        self.stopwatch.stop();
        debug!("trip cleared");
    }

    /// Dispatch a delivery from the location service. Delivery errors
    /// leave the trip untouched.
    pub fn on_update(&mut self, update: LocationUpdate) {
        match update {
            LocationUpdate::Fix(fix) => self.on_fix(fix),
            LocationUpdate::Error(e) => debug!(error = %e, "ignoring failed location delivery"),
        }
    }

    pub fn on_fix(&mut self, fix: LocationFix) {
        self.state.current_speed_meters_per_second =
            fix.speed_meters_per_second.map_or(0.0, |s| s.max(0.0));
        self.state.altitude_meters = fix.altitude_meters.unwrap_or(0.0);
        self.position = Some(fix);

        if !self.state.recording {
            return;
        }

        match self.state.last_fix {
            // the start point has no predecessor, but it is on the route
            None => {
                self.state.path.push(fix);
                self.state.last_fix = Some(fix);
            }
            Some(anchor) => {
                let delta = distance_from_anchor(Some(&anchor), &fix);

                if self.is_implausible(&anchor, &fix, delta) {
                    self.rejected_in_row += 1;
                    debug!(
                        delta_meters = delta,
                        rejected_in_row = self.rejected_in_row,
                        "discarding implausible jump"
                    );
                    if self.rejected_in_row >= REANCHOR_AFTER_REJECTIONS {
                        self.state.last_fix = Some(fix);
                        self.rejected_in_row = 0;
                    }
                } else {
                    self.rejected_in_row = 0;
                    self.state.distance_meters += delta;
                    self.state.path.push(fix);
                    self.state.last_fix = Some(fix);
                }
            }
        }

        self.state.average_speed_meters_per_second =
            average_speed(self.state.distance_meters, self.stopwatch.elapsed_seconds());
    }

    fn is_implausible(&self, anchor: &LocationFix, fix: &LocationFix, delta: f64) -> bool {
        let Some(max_speed) = self.max_plausible_speed else {
            return false;
        };

        let dt_ms = fix.timestamp_millis.saturating_sub(anchor.timestamp_millis);
        if dt_ms <= 0 {
            return false;
        }

        delta / (dt_ms as f64 / 1000.0) > max_speed
    }

    pub fn state(&self) -> &TripState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state.recording
    }

    pub fn distance_meters(&self) -> f64 {
        self.state.distance_meters
    }

    pub fn current_speed(&self) -> f64 {
        self.state.current_speed_meters_per_second
    }

    pub fn average_speed(&self) -> f64 {
        self.state.average_speed_meters_per_second
    }

    pub fn altitude_meters(&self) -> f64 {
        self.state.altitude_meters
    }

    pub fn path(&self) -> &[LocationFix] {
        &self.state.path
    }

    /// Where the position marker points, recording or not
    pub fn position(&self) -> Option<&LocationFix> {
        self.position.as_ref()
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn stopwatch_mut(&mut self) -> &mut Stopwatch {
        &mut self.stopwatch
    }

    pub fn summary(&self) -> TripSummary {
        TripSummary {
            distance_meters: self.state.distance_meters,
            elapsed_seconds: self.stopwatch.elapsed_seconds(),
            average_speed_meters_per_second: self.state.average_speed_meters_per_second,
            path_points: self.state.path.len(),
        }
    }
}

impl Default for TripEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance over elapsed time, zero when no time has elapsed
pub fn average_speed(distance_meters: f64, elapsed_seconds: i64) -> f64 {
    if elapsed_seconds <= 0 {
        return 0.0;
    }

    let speed = distance_meters / elapsed_seconds as f64;
    if speed.is_finite() {
        speed
    } else {
        0.0
    }
}
