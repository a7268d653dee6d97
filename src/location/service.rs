// src/location/service.rs
//! Location service: reads a receiver and pushes updates to the tracker

use super::{
    filter::UpdateFilter,
    fix::LocationUpdate,
    gpsd,
    nmea::NmeaReceiver,
};
use crate::error::{Result, TrackerError};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Channel depth between the reader task and the tracker
const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// Location data source configuration
#[derive(Debug, Clone, PartialEq)]
pub enum LocationSource {
    Serial { port: String, baudrate: u32 },
    Gpsd { host: String, port: u16 },
}

/// Line-oriented protocol spoken by a source
enum Protocol {
    Nmea(NmeaReceiver),
    Gpsd,
}

impl Protocol {
    fn parse(&mut self, line: &str) -> Option<LocationUpdate> {
        match self {
            Protocol::Nmea(receiver) => receiver.parse_sentence(line),
            Protocol::Gpsd => match gpsd::parse_gpsd_json(line) {
                Ok(update) => update,
                Err(e) => {
                    debug!(error = %e, "skipping gpsd line");
                    None
                }
            },
        }
    }
}

/// Owns the reader task that turns a receiver into a stream of updates
pub struct LocationService {
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl LocationService {
    /// Connect to `source` and start delivering filtered updates.
    pub async fn start(
        source: LocationSource,
        filter: UpdateFilter,
    ) -> Result<(Self, mpsc::Receiver<LocationUpdate>)> {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        let task = match source {
            LocationSource::Serial { port, baudrate } => {
                info!(%port, baudrate, "connecting to serial receiver");

                let serial = tokio_serial::new(&port, baudrate)
                    .timeout(Duration::from_millis(1000))
                    .open_native_async()
                    .map_err(|e| TrackerError::Connection(format!("Failed to open serial port {}: {}", port, e)))?;

                let reader = BufReader::new(serial);
                let protocol = Protocol::Nmea(NmeaReceiver::new());
                tokio::spawn(pump(reader, protocol, filter, tx, Arc::clone(&running)))
            }
            LocationSource::Gpsd { host, port } => {
                info!(%host, port, "connecting to gpsd");

                let reader = gpsd::connect_gpsd(&host, port).await?;
                tokio::spawn(pump(reader, Protocol::Gpsd, filter, tx, Arc::clone(&running)))
            }
        };

        info!("location service started");

        Ok((
            Self {
                running,
                task: Some(task),
            },
            rx,
        ))
    }

    /// Stop delivering updates
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Check if the reader is still delivering
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
            && self.task.as_ref().map_or(false, |t| !t.is_finished())
    }
}

impl Drop for LocationService {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read lines until EOF, error, stop, or the consumer hangs up
async fn pump<R>(
    mut reader: R,
    mut protocol: Protocol,
    mut filter: UpdateFilter,
    tx: mpsc::Sender<LocationUpdate>,
    running: Arc<AtomicBool>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();

    while running.load(Ordering::Relaxed) {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break, // EOF
            Ok(_) => {
                // Receivers emit noise at power-up and after baud glitches
                let Ok(line) = std::str::from_utf8(&buf) else {
                    debug!(bytes = buf.len(), "skipping line that is not UTF-8");
                    continue;
                };

                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let Some(update) = protocol.parse(line) else {
                    continue;
                };

                let Some(update) = screen(update, &mut filter) else {
                    continue;
                };

                if tx.send(update).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "error reading from location source");
                let _ = tx.send(LocationUpdate::Error(e.to_string())).await;
                break;
            }
        }
    }

    running.store(false, Ordering::Relaxed);
    debug!("location reader finished");
}

/// Validate and filter a parsed update before it leaves the service
fn screen(update: LocationUpdate, filter: &mut UpdateFilter) -> Option<LocationUpdate> {
    match update {
        LocationUpdate::Fix(fix) => {
            if let Err(e) = fix.validate() {
                return Some(LocationUpdate::Error(e.to_string()));
            }
            filter.accept(&fix).then_some(LocationUpdate::Fix(fix))
        }
        error => Some(error),
    }
}

/// List available serial ports
pub async fn list_serial_ports() -> Result<()> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| TrackerError::Other(format!("Failed to list serial ports: {}", e)))?;

    if ports.is_empty() {
        println!("No serial ports found.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {} - {:?}", port.port_name, port.port_type);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationFix;

    #[test]
    fn test_screen_rejects_out_of_range() {
        let mut filter = UpdateFilter::default();
        let update = screen(LocationFix::new(95.0, 0.0, 0).into(), &mut filter);
        assert!(matches!(update, Some(LocationUpdate::Error(_))));
    }

    #[test]
    fn test_screen_passes_errors_through() {
        let mut filter = UpdateFilter::default();
        let update = screen(LocationUpdate::Error("no fix".to_string()), &mut filter);
        assert_eq!(update, Some(LocationUpdate::Error("no fix".to_string())));
    }

    #[tokio::test]
    async fn test_pump_nmea_stream() {
        let input = concat!(
            "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\n",
            "\n",
            "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\n",
            // same timestamp again, dropped by the interval filter
            "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\n",
        );
        let reader = BufReader::new(input.as_bytes());
        let (tx, mut rx) = mpsc::channel(8);
        let running = Arc::new(AtomicBool::new(true));

        pump(
            reader,
            Protocol::Nmea(NmeaReceiver::new()),
            UpdateFilter::default(),
            tx,
            Arc::clone(&running),
        )
        .await;

        match rx.recv().await {
            Some(LocationUpdate::Fix(fix)) => assert_eq!(fix.altitude_meters, Some(545.4)),
            other => panic!("expected a fix, got {:?}", other),
        }
        assert!(rx.recv().await.is_none());
        assert!(!running.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_pump_survives_garbage_bytes() {
        let mut input: Vec<u8> = vec![0xFF, 0xFE, b'\n', 0x00, 0xC3, b'$', b'\n'];
        input.extend_from_slice(
            b"$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\n",
        );
        let reader = BufReader::new(input.as_slice());
        let (tx, mut rx) = mpsc::channel(8);

        pump(
            reader,
            Protocol::Nmea(NmeaReceiver::new()),
            UpdateFilter::default(),
            tx,
            Arc::new(AtomicBool::new(true)),
        )
        .await;

        match rx.recv().await {
            Some(LocationUpdate::Fix(fix)) => assert!((fix.latitude - 48.1173).abs() < 0.0001),
            other => panic!("expected a fix after the noise, got {:?}", other),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_pump_gpsd_stream() {
        let input = concat!(
            "{\"class\":\"VERSION\",\"release\":\"3.25\"}\n",
            "{\"class\":\"TPV\",\"mode\":1}\n",
            "not json\n",
            "{\"class\":\"TPV\",\"mode\":3,\"time\":\"2023-01-01T12:00:00.000Z\",\"lat\":1.0,\"lon\":2.0,\"speed\":3.5}\n",
        );
        let reader = BufReader::new(input.as_bytes());
        let (tx, mut rx) = mpsc::channel(8);

        pump(
            reader,
            Protocol::Gpsd,
            UpdateFilter::default(),
            tx,
            Arc::new(AtomicBool::new(true)),
        )
        .await;

        assert!(matches!(rx.recv().await, Some(LocationUpdate::Error(_))));
        match rx.recv().await {
            Some(LocationUpdate::Fix(fix)) => {
                assert_eq!(fix.speed_meters_per_second, Some(3.5));
            }
            other => panic!("expected a fix, got {:?}", other),
        }
        assert!(rx.recv().await.is_none());
    }
}
