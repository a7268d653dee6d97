// src/location/nmea.rs
//! NMEA sentence parsing for serial receivers

use super::fix::{LocationFix, LocationUpdate};
use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::debug;

const KNOTS_TO_METERS_PER_SECOND: f64 = 1852.0 / 3600.0;

/// Turns a stream of NMEA sentences into location updates.
///
/// `RMC` sentences carry position, speed and time, so they produce the
/// fixes. `GGA` only contributes the altitude, which is attached to the
/// next `RMC` fix.
#[derive(Debug, Default)]
pub struct NmeaReceiver {
    last_altitude: Option<f64>,
}

impl NmeaReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single NMEA sentence
    pub fn parse_sentence(&mut self, line: &str) -> Option<LocationUpdate> {
        let line = line.trim();
        if !checksum_ok(line) {
            debug!(sentence = line, "dropping NMEA sentence with bad checksum");
            return None;
        }

        let body = line.split('*').next().unwrap_or(line);
        let parts: Vec<&str> = body.split(',').collect();

        if line.starts_with("$GPGGA") || line.starts_with("$GNGGA") {
            self.parse_gga(&parts);
            None
        } else if line.starts_with("$GPRMC") || line.starts_with("$GNRMC") {
            self.parse_rmc(&parts)
        } else {
            None
        }
    }

    pub fn last_altitude(&self) -> Option<f64> {
        self.last_altitude
    }

    /// GGA (Global Positioning System Fix Data): altitude in field 9
    fn parse_gga(&mut self, parts: &[&str]) {
        if parts.len() < 10 {
            return;
        }

        // Fix quality 0 means the altitude field is stale
        match parts[6].parse::<u8>() {
            Ok(quality) if quality > 0 => {}
            _ => return,
        }

        if let Ok(alt) = parts[9].parse::<f64>() {
            self.last_altitude = Some(alt);
        }
    }

    /// RMC (Recommended Minimum Course): position, speed, date and time
    fn parse_rmc(&mut self, parts: &[&str]) -> Option<LocationUpdate> {
        if parts.len() < 10 {
            return None;
        }

        if parts[2] != "A" {
            return Some(LocationUpdate::Error(
                "receiver reports no valid fix".to_string(),
            ));
        }

        let latitude = parse_coordinate(parts[3], parts[4], "S")?;
        let longitude = parse_coordinate(parts[5], parts[6], "W")?;
        let timestamp_millis = parse_timestamp(parts[9], parts[1])
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        let mut fix = LocationFix::new(latitude, longitude, timestamp_millis);

        // Speed over ground in knots (field 7)
        if let Ok(knots) = parts[7].parse::<f64>() {
            fix = fix.with_speed(knots * KNOTS_TO_METERS_PER_SECOND);
        }

        if let Some(alt) = self.last_altitude {
            fix = fix.with_altitude(alt);
        }

        Some(LocationUpdate::Fix(fix))
    }
}

/// `ddmm.mmmm` / `dddmm.mmmm` plus hemisphere into signed decimal degrees
fn parse_coordinate(value: &str, hemisphere: &str, negative: &str) -> Option<f64> {
    if value.is_empty() || hemisphere.is_empty() {
        return None;
    }

    let raw = value.parse::<f64>().ok()?;
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    if hemisphere == negative {
        Some(-decimal)
    } else {
        Some(decimal)
    }
}

/// RMC `ddmmyy` date and `hhmmss[.sss]` time into Unix milliseconds
fn parse_timestamp(date: &str, time: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(date, "%d%m%y").ok()?;

    let (whole, fraction) = match time.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (time, ""),
    };
    let time = NaiveTime::parse_from_str(whole, "%H%M%S").ok()?;

    let millis = if fraction.is_empty() {
        0
    } else {
        let digits: String = fraction.chars().chain("000".chars()).take(3).collect();
        digits.parse::<i64>().ok()?
    };

    Some(date.and_time(time).and_utc().timestamp_millis() + millis)
}

/// Validate the `*hh` XOR checksum when the sentence carries one
fn checksum_ok(line: &str) -> bool {
    let Some(body) = line.strip_prefix('$') else {
        return false;
    };

    match body.split_once('*') {
        Some((payload, expected)) => {
            let computed = payload.bytes().fold(0u8, |acc, b| acc ^ b);
            u8::from_str_radix(expected.trim(), 16).map_or(false, |e| e == computed)
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_checksum(body: &str) -> String {
        let sum = body.bytes().fold(0u8, |acc, b| acc ^ b);
        format!("${}*{:02X}", body, sum)
    }

    #[test]
    fn test_rmc_produces_fix() {
        let mut receiver = NmeaReceiver::new();
        let rmc = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

        let update = receiver.parse_sentence(rmc).unwrap();
        let LocationUpdate::Fix(fix) = update else {
            panic!("expected a fix, got {:?}", update);
        };

        assert!((fix.latitude - 48.1173).abs() < 0.0001);
        assert!((fix.longitude - 11.5167).abs() < 0.0001);
        // 22.4 knots
        assert!((fix.speed_meters_per_second.unwrap() - 11.5236).abs() < 0.001);
        assert_eq!(fix.altitude_meters, None);
        assert_eq!(
            fix.timestamp().unwrap().to_rfc3339(),
            "1994-03-23T12:35:19+00:00"
        );
    }

    #[test]
    fn test_gga_altitude_is_attached_to_next_fix() {
        let mut receiver = NmeaReceiver::new();
        let gga = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let rmc = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

        assert!(receiver.parse_sentence(gga).is_none());
        assert_eq!(receiver.last_altitude(), Some(545.4));

        match receiver.parse_sentence(rmc) {
            Some(LocationUpdate::Fix(fix)) => assert_eq!(fix.altitude_meters, Some(545.4)),
            other => panic!("expected a fix, got {:?}", other),
        }
    }

    #[test]
    fn test_void_rmc_is_delivery_error() {
        let mut receiver = NmeaReceiver::new();
        let rmc = with_checksum("GPRMC,123519,V,,,,,,,230394,,");

        assert!(matches!(
            receiver.parse_sentence(&rmc),
            Some(LocationUpdate::Error(_))
        ));
    }

    #[test]
    fn test_southern_western_hemispheres() {
        let mut receiver = NmeaReceiver::new();
        let rmc = with_checksum("GNRMC,101500.50,A,2332.808,S,04637.824,W,5.0,90.0,150623,,");

        match receiver.parse_sentence(&rmc) {
            Some(LocationUpdate::Fix(fix)) => {
                assert!(fix.latitude < -23.5 && fix.latitude > -23.6);
                assert!(fix.longitude < -46.6 && fix.longitude > -46.7);
                assert_eq!(fix.timestamp_millis % 1000, 500);
            }
            other => panic!("expected a fix, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_checksum_is_ignored() {
        let mut receiver = NmeaReceiver::new();
        let rmc = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*00";
        assert!(receiver.parse_sentence(rmc).is_none());
    }

    #[test]
    fn test_invalid_sentence() {
        let mut receiver = NmeaReceiver::new();

        // Should not crash and should not produce anything
        assert!(receiver.parse_sentence("$INVALID,123,456").is_none());
        assert!(receiver.parse_sentence("garbage").is_none());
        assert!(receiver.last_altitude().is_none());
    }

    #[test]
    fn test_gga_without_fix_keeps_altitude() {
        let mut receiver = NmeaReceiver::new();
        let gga = with_checksum("GPGGA,123519,,,,,0,00,,999.0,M,,M,,");
        receiver.parse_sentence(&gga);
        assert_eq!(receiver.last_altitude(), None);
    }
}
