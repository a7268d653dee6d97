// src/trip/mod.rs
//! Trip metrics engine and stopwatch

pub mod engine;
pub mod format;
pub mod stopwatch;

pub use engine::{TripEngine, TripState, TripSummary};
pub use stopwatch::{Stopwatch, StopwatchState};
