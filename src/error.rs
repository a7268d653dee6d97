// src/error.rs
//! Error types for the ride tracker

use std::fmt;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug)]
pub enum TrackerError {
    Io(std::io::Error),
    Serial(tokio_serial::Error),
    Json(serde_json::Error),
    Connection(String),
    Parse(String),
    InvalidFix(String),
    Config(String),
    Other(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Io(e) => write!(f, "IO error: {}", e),
            TrackerError::Serial(e) => write!(f, "Serial error: {}", e),
            TrackerError::Json(e) => write!(f, "JSON error: {}", e),
            TrackerError::Connection(msg) => write!(f, "Connection error: {}", msg),
            TrackerError::Parse(msg) => write!(f, "Parse error: {}", msg),
            TrackerError::InvalidFix(msg) => write!(f, "Invalid fix: {}", msg),
            TrackerError::Config(msg) => write!(f, "Config error: {}", msg),
            TrackerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Io(e) => Some(e),
            TrackerError::Serial(e) => Some(e),
            TrackerError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(error: std::io::Error) -> Self {
        TrackerError::Io(error)
    }
}

impl From<tokio_serial::Error> for TrackerError {
    fn from(error: tokio_serial::Error) -> Self {
        TrackerError::Serial(error)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(error: serde_json::Error) -> Self {
        TrackerError::Json(error)
    }
}

impl From<anyhow::Error> for TrackerError {
    fn from(error: anyhow::Error) -> Self {
        TrackerError::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = TrackerError::InvalidFix("latitude 91 out of range".to_string());
        assert_eq!(err.to_string(), "Invalid fix: latitude 91 out of range");

        let err = TrackerError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Connection error: refused");
    }

    #[test]
    fn test_from_io_keeps_source() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TrackerError = io.into();
        assert!(matches!(err, TrackerError::Io(_)));
        assert!(err.source().is_some());
    }
}
