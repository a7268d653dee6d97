// src/session.rs
//! Tracking session: one event loop driving the engine, stopwatch and HUD

use crate::{
    controls::Control,
    display::{Dashboard, Hud},
    error::Result,
    location::LocationUpdate,
    trip::{StopwatchState, TripEngine, TripSummary},
};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// The tracking screen.
///
/// Location updates, user controls and stopwatch ticks are handled one at a
/// time on a single task, so the engine is never touched concurrently.
pub struct TrackingSession<H: Hud> {
    engine: TripEngine,
    hud: H,
}

impl<H: Hud> TrackingSession<H> {
    pub fn new(engine: TripEngine, hud: H) -> Self {
        Self { engine, hud }
    }

    pub fn engine(&self) -> &TripEngine {
        &self.engine
    }

    /// Play/pause button: start, pause or resume both the recording gate
    /// and the stopwatch
    pub fn toggle(&mut self) {
        match self.engine.stopwatch().state() {
            StopwatchState::Running => {
                debug!("pause");
                self.engine.stop_recording();
                self.engine.stopwatch_mut().pause();
            }
            StopwatchState::Paused => {
                debug!("resume");
                self.engine.start_recording();
                self.engine.stopwatch_mut().resume();
            }
            StopwatchState::Idle => {
                debug!("play");
                self.engine.start_recording();
                self.engine.stopwatch_mut().start();
            }
        }
    }

    /// Stop button: pause without clearing
    pub fn pause(&mut self) {
        self.engine.stop_recording();
        self.engine.stopwatch_mut().pause();
    }

    /// Clear button: drop the trip and zero the stopwatch
    pub fn clear(&mut self) {
        self.engine.reset();
    }

    /// Apply a control. Returns false when the session should end.
    pub fn handle_control(&mut self, control: Control) -> bool {
        match control {
            Control::Toggle => self.toggle(),
            Control::Pause => self.pause(),
            Control::Clear => self.clear(),
            Control::Quit => return false,
        }
        true
    }

    pub fn handle_update(&mut self, update: LocationUpdate) {
        self.engine.on_update(update);
    }

    fn redraw(&mut self) -> Result<()> {
        let dashboard = Dashboard::from_engine(&self.engine);
        self.hud.render(&dashboard)
    }

    /// Run until `Quit`, or until the control channel closes.
    ///
    /// A closed update channel only stops location input; the stopwatch and
    /// controls keep working. Returns the trip as it stood when the session
    /// ended.
    pub async fn run(
        mut self,
        mut updates: mpsc::Receiver<LocationUpdate>,
        mut controls: mpsc::Receiver<Control>,
    ) -> Result<TripSummary> {
        self.hud.enter()?;
        let result = self.event_loop(&mut updates, &mut controls).await;
        let summary = self.engine.summary();

        // teardown: no tick may outlive the screen
        self.engine.stopwatch_mut().stop();
        self.hud.leave()?;

        result.map(|_| summary)
    }

    async fn event_loop(
        &mut self,
        updates: &mut mpsc::Receiver<LocationUpdate>,
        controls: &mut mpsc::Receiver<Control>,
    ) -> Result<()> {
        let mut updates_open = true;
        self.redraw()?;

        loop {
            tokio::select! {
                update = updates.recv(), if updates_open => match update {
                    Some(update) => self.handle_update(update),
                    None => {
                        info!("location updates ended");
                        updates_open = false;
                    }
                },
                control = controls.recv() => match control {
                    Some(control) => {
                        if !self.handle_control(control) {
                            return Ok(());
                        }
                    }
                    None => return Ok(()),
                },
                elapsed = self.engine.stopwatch_mut().next_tick() => {
                    debug!(elapsed, "tick");
                }
            }

            self.redraw()?;
        }
    }
}
