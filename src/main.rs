// src/main.rs
//! Ride Tracker - terminal bike ride tracker

use anyhow::Context;
use clap::Parser;
use ride_tracker::{
    config::TrackerConfig,
    controls::{self, Control},
    display::terminal::TerminalDisplay,
    location::service::list_serial_ports,
    trip::{engine::average_speed, format},
    LocationService, TrackingSession, TripEngine,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ride-tracker", version, about = "Track a bike ride from GPS fixes")]
struct Cli {
    /// Read NMEA from this serial port instead of gpsd
    #[arg(long)]
    serial: Option<String>,

    /// Serial baud rate
    #[arg(long, default_value_t = 9600)]
    baudrate: u32,

    /// gpsd host
    #[arg(long)]
    gpsd_host: Option<String>,

    /// gpsd port
    #[arg(long)]
    gpsd_port: Option<u16>,

    /// Minimum distance in meters between delivered fixes
    #[arg(long)]
    min_distance: Option<f64>,

    /// Minimum time in milliseconds between delivered fixes
    #[arg(long)]
    min_interval_ms: Option<u64>,

    /// Discard jumps implying more than this speed (m/s); 0 disables the check
    #[arg(long)]
    max_speed: Option<f64>,

    /// Write the effective settings to the config file
    #[arg(long)]
    save_config: bool,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

impl Cli {
    fn apply(&self, config: &mut TrackerConfig) {
        if let Some(port) = &self.serial {
            config.update_serial(port.clone(), self.baudrate);
        }
        if self.gpsd_host.is_some() || self.gpsd_port.is_some() {
            let host = self
                .gpsd_host
                .clone()
                .or_else(|| config.gpsd_host.clone())
                .unwrap_or_else(|| "localhost".to_string());
            let port = self.gpsd_port.or(config.gpsd_port).unwrap_or(2947);
            config.update_gpsd(host, port);
        }
        if let Some(meters) = self.min_distance {
            config.min_distance_meters = meters;
        }
        if let Some(ms) = self.min_interval_ms {
            config.min_interval_ms = ms;
        }
        if let Some(speed) = self.max_speed {
            config.max_plausible_speed_mps = (speed > 0.0).then_some(speed);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the HUD
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_ports {
        list_serial_ports().await?;
        return Ok(());
    }

    let mut config = TrackerConfig::load().context("loading configuration")?;
    cli.apply(&mut config);

    if cli.save_config {
        let path = config.save()?;
        info!(path = %path.display(), "configuration saved");
    }

    let source = config.location_source()?;
    let (mut service, updates) = LocationService::start(source, config.update_filter())
        .await
        .context("starting location service")?;

    let (control_tx, control_rx) = mpsc::channel(16);
    let running = Arc::new(AtomicBool::new(true));
    let key_reader = controls::spawn_key_reader(control_tx.clone(), Arc::clone(&running));

    // Ctrl+C outside raw mode
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = control_tx.send(Control::Quit).await;
        }
    });

    let engine = TripEngine::with_max_plausible_speed(config.max_plausible_speed_mps);
    let session = TrackingSession::new(engine, TerminalDisplay::new());
    let result = session.run(updates, control_rx).await;

    running.store(false, Ordering::Relaxed);
    service.stop();
    let _ = key_reader.join();

    let summary = result?;
    println!("\nRide summary");
    println!("  Time:          {}", ride_tracker::trip::stopwatch::format_elapsed(summary.elapsed_seconds));
    println!("  Distance:      {}", format::format_distance(summary.distance_meters));
    println!(
        "  Average speed: {}",
        format::format_speed(average_speed(summary.distance_meters, summary.elapsed_seconds))
    );
    println!("  Path points:   {}", summary.path_points);

    Ok(())
}
