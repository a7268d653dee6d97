// src/display/terminal.rs
//! Terminal-based heads-up display

use super::{Dashboard, Hud};
use crate::error::{Result, TrackerError};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use std::io::{self, Write};

/// Raw mode needs explicit carriage returns
const NL: &str = "\r\n";

pub struct TerminalDisplay<W: Write = io::Stdout> {
    out: W,
    raw: bool,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            raw: true,
        }
    }
}

impl<W: Write> TerminalDisplay<W> {
    /// Render into any writer without touching terminal modes
    pub fn with_writer(out: W) -> Self {
        Self { out, raw: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_header(&mut self, dashboard: &Dashboard) -> Result<()> {
        let status_color = if dashboard.recording {
            Color::Red
        } else {
            Color::Grey
        };

        queue!(
            self.out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(44)),
            Print(NL),
            Print("Ride Tracker"),
            ResetColor,
            Print("   "),
            SetForegroundColor(status_color),
            Print(format!("● {}", dashboard.status_label())),
            ResetColor,
            Print(NL),
            SetForegroundColor(Color::Green),
            Print("=".repeat(44)),
            Print(NL),
            ResetColor
        )?;

        Ok(())
    }

    fn render_stopwatch_section(&mut self, dashboard: &Dashboard) -> Result<()> {
        queue!(
            self.out,
            SetForegroundColor(Color::Yellow),
            Print(format!("STOPWATCH{}", NL)),
            ResetColor,
            Print(format!("  {:>12}{}{}", dashboard.elapsed, NL, NL))
        )?;

        Ok(())
    }

    fn render_metrics_section(&mut self, dashboard: &Dashboard) -> Result<()> {
        queue!(
            self.out,
            SetForegroundColor(Color::Cyan),
            Print(format!("RIDE{}", NL)),
            ResetColor,
            Print(format!("  Speed:         {:>12}{}", dashboard.speed, NL)),
            Print(format!("  Average speed: {:>12}{}", dashboard.average_speed, NL)),
            Print(format!("  Altitude:      {:>12}{}", dashboard.altitude, NL)),
            Print(format!("  Distance:      {:>12}{}{}", dashboard.distance, NL, NL))
        )?;

        Ok(())
    }

    fn render_position_section(&mut self, dashboard: &Dashboard) -> Result<()> {
        let last_fix = match dashboard.last_fix {
            Some(ts) => ts.format("%H:%M:%S UTC").to_string(),
            None => "No data received".to_string(),
        };

        queue!(
            self.out,
            SetForegroundColor(Color::Magenta),
            Print(format!("POSITION{}", NL)),
            ResetColor,
            Print(format!("  Latitude:  {:>14}{}", dashboard.latitude, NL)),
            Print(format!("  Longitude: {:>14}{}", dashboard.longitude, NL)),
            Print(format!("  Path:      {:>7} points{}", dashboard.path_points, NL)),
            Print(format!("  Last fix:  {}{}{}", last_fix, NL, NL))
        )?;

        Ok(())
    }

    fn render_footer(&mut self, dashboard: &Dashboard) -> Result<()> {
        queue!(
            self.out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(44)),
            Print(NL),
            Print(format!(
                "[space] {}  [s] pause  [c] clear  [q] quit{}",
                dashboard.toggle_label(),
                NL
            )),
            ResetColor
        )?;

        Ok(())
    }
}

impl<W: Write> Hud for TerminalDisplay<W> {
    fn enter(&mut self) -> Result<()> {
        if self.raw {
            terminal::enable_raw_mode()?;
            execute!(self.out, Hide, DisableLineWrap)?;
        }
        Ok(())
    }

    fn render(&mut self, dashboard: &Dashboard) -> Result<()> {
        if self.raw {
            queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }

        self.render_header(dashboard)?;
        self.render_stopwatch_section(dashboard)?;
        self.render_metrics_section(dashboard)?;
        self.render_position_section(dashboard)?;
        self.render_footer(dashboard)?;

        self.out.flush().map_err(TrackerError::Io)
    }

    fn leave(&mut self) -> Result<()> {
        if self.raw {
            execute!(self.out, Show, EnableLineWrap)?;
            terminal::disable_raw_mode()?;
        }
        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::TripEngine;

    #[test]
    fn test_render_to_buffer() {
        let dashboard = Dashboard::from_engine(&TripEngine::new());
        let mut display = TerminalDisplay::with_writer(Vec::new());

        display.enter().unwrap();
        display.render(&dashboard).unwrap();
        display.leave().unwrap();

        let text = String::from_utf8(display.into_inner()).unwrap();
        assert!(text.contains("Ride Tracker"));
        assert!(text.contains("00:00:00"));
        assert!(text.contains("0.00 m/s"));
        assert!(text.contains("[space] START"));
        assert!(text.contains("No data received"));
    }
}
