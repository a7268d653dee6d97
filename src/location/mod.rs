// src/location/mod.rs
//! Location fix ingest: receivers, parsing, validation and filtering

pub mod filter;
pub mod fix;
pub mod gpsd;
pub mod nmea;
pub mod service;

pub use filter::UpdateFilter;
pub use fix::{LocationFix, LocationUpdate};
pub use service::{LocationService, LocationSource};
