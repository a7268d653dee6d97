// src/lib.rs
//! Ride Tracker Library
//!
//! Tracks a bike ride from GPS fixes: distance travelled, current and
//! average speed, altitude and an elapsed-time stopwatch, shown on a
//! terminal heads-up display.

pub mod config;
pub mod controls;
pub mod display;
pub mod error;
pub mod geo;
pub mod location;
pub mod session;
pub mod trip;

// Re-export main types for convenience
pub use error::{Result, TrackerError};
pub use location::{LocationFix, LocationService, LocationSource, LocationUpdate};
pub use session::TrackingSession;
pub use trip::{Stopwatch, TripEngine, TripState, TripSummary};
