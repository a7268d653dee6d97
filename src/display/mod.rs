// src/display/mod.rs
//! Heads-up display of the running trip

pub mod terminal;

use crate::{
    error::Result,
    trip::{format, StopwatchState, TripEngine},
};
use chrono::{DateTime, Utc};

/// Something that can show the dashboard
pub trait Hud {
    /// Called once before the first frame
    fn enter(&mut self) -> Result<()> {
        Ok(())
    }

    /// Draw one frame
    fn render(&mut self, dashboard: &Dashboard) -> Result<()>;

    /// Called once after the last frame
    fn leave(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Formatted snapshot of everything the HUD shows
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub elapsed: String,
    pub speed: String,
    pub average_speed: String,
    pub altitude: String,
    pub distance: String,
    pub latitude: String,
    pub longitude: String,
    pub last_fix: Option<DateTime<Utc>>,
    pub path_points: usize,
    pub recording: bool,
    pub stopwatch: StopwatchState,
}

impl Dashboard {
    pub fn from_engine(engine: &TripEngine) -> Self {
        let position = engine.position();

        Self {
            elapsed: engine.stopwatch().formatted(),
            speed: format::format_speed(engine.current_speed()),
            average_speed: format::format_speed(engine.average_speed()),
            altitude: format::format_altitude(engine.altitude_meters()),
            distance: format::format_distance(engine.distance_meters()),
            latitude: format::format_coordinate(position.map(|p| p.latitude)),
            longitude: format::format_coordinate(position.map(|p| p.longitude)),
            last_fix: position.and_then(|p| p.timestamp()),
            path_points: engine.path().len(),
            recording: engine.is_recording(),
            stopwatch: engine.stopwatch().state(),
        }
    }

    /// What the play/pause control would do next
    pub fn toggle_label(&self) -> &'static str {
        match self.stopwatch {
            StopwatchState::Idle => "START",
            StopwatchState::Running => "PAUSE",
            StopwatchState::Paused => "RESUME",
        }
    }

    pub fn status_label(&self) -> &'static str {
        match (self.recording, self.stopwatch) {
            (true, _) => "RECORDING",
            (false, StopwatchState::Paused) => "PAUSED",
            (false, _) => "READY",
        }
    }
}
