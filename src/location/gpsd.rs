// src/location/gpsd.rs
//! GPSD client implementation

use super::fix::{LocationFix, LocationUpdate};
use crate::error::{Result, TrackerError};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::{
    io::{AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tracing::info;

#[derive(Debug, Deserialize)]
struct GpsdMessage {
    class: String,
    #[serde(flatten)]
    data: HashMap<String, serde_json::Value>,
}

/// Connect to a gpsd daemon and return a stream reader
pub async fn connect_gpsd(host: &str, port: u16) -> Result<BufReader<TcpStream>> {
    let mut stream = TcpStream::connect(format!("{}:{}", host, port))
        .await
        .map_err(|e| TrackerError::Connection(format!("Failed to connect to gpsd at {}:{}: {}", host, port, e)))?;

    // Send WATCH command to start receiving JSON data
    let watch_cmd = "?WATCH={\"enable\":true,\"json\":true}\n";
    stream
        .write_all(watch_cmd.as_bytes())
        .await
        .map_err(|e| TrackerError::Connection(format!("Failed to send WATCH command: {}", e)))?;

    Ok(BufReader::new(stream))
}

/// Parse a single line of gpsd JSON data.
///
/// Only `TPV` reports turn into updates; other classes are informational.
pub fn parse_gpsd_json(line: &str) -> Result<Option<LocationUpdate>> {
    let msg: GpsdMessage = serde_json::from_str(line)
        .map_err(|e| TrackerError::Parse(format!("Failed to parse gpsd JSON: {}", e)))?;

    let update = match msg.class.as_str() {
        "TPV" => parse_tpv_message(&msg.data),
        "VERSION" => {
            parse_version_message(&msg.data);
            None
        }
        "DEVICES" => {
            parse_devices_message(&msg.data);
            None
        }
        _ => None,
    };

    Ok(update)
}

/// Parse TPV (Time Position Velocity) message
fn parse_tpv_message(msg_data: &HashMap<String, serde_json::Value>) -> Option<LocationUpdate> {
    let mode = msg_data.get("mode").and_then(|v| v.as_u64()).unwrap_or(0);
    if mode < 2 {
        return Some(LocationUpdate::Error(format!("gpsd reports no fix (mode {})", mode)));
    }

    let lat = msg_data.get("lat").and_then(|v| v.as_f64())?;
    let lon = msg_data.get("lon").and_then(|v| v.as_f64())?;

    let timestamp_millis = msg_data
        .get("time")
        .and_then(|v| v.as_str())
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc).timestamp_millis())
        .unwrap_or_else(|| Utc::now().timestamp_millis());

    let mut fix = LocationFix::new(lat, lon, timestamp_millis);

    // gpsd 3.20+ reports altHAE/altMSL, older releases only alt
    let altitude = ["altMSL", "alt", "altHAE"]
        .iter()
        .find_map(|key| msg_data.get(*key).and_then(|v| v.as_f64()));
    if let Some(alt) = altitude {
        fix = fix.with_altitude(alt);
    }

    // Already m/s
    if let Some(speed) = msg_data.get("speed").and_then(|v| v.as_f64()) {
        fix = fix.with_speed(speed);
    }

    Some(LocationUpdate::Fix(fix))
}

/// Parse VERSION message (informational)
fn parse_version_message(msg_data: &HashMap<String, serde_json::Value>) {
    if let Some(version) = msg_data.get("release").and_then(|v| v.as_str()) {
        info!(version, "connected to gpsd");
    }
}

/// Parse DEVICES message (informational)
fn parse_devices_message(msg_data: &HashMap<String, serde_json::Value>) {
    if let Some(devices) = msg_data.get("devices").and_then(|v| v.as_array()) {
        info!(count = devices.len(), "gpsd managing devices");
        for device in devices {
            if let Some(path) = device.get("path").and_then(|v| v.as_str()) {
                info!(path, "gpsd device");
            }
        }
    }
}
