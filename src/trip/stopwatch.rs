// src/trip/stopwatch.rs
//! Start/pause/resume/stop stopwatch counting whole seconds

use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchState {
    Idle,
    Running,
    Paused,
}

/// Counts active seconds with a recurring one-second timer.
///
/// The timer handle lives only while the stopwatch is running. Pausing,
/// stopping and dropping the stopwatch all drop it, so no tick can land
/// after any of those.
///
/// State changes only record when the stopwatch was armed; the interval
/// itself is built on the first `next_tick`, so `start` and friends can be
/// called outside a Tokio runtime.
#[derive(Debug)]
pub struct Stopwatch {
    state: StopwatchState,
    elapsed_seconds: i64,
    armed_at: Option<Instant>,
    timer: Option<Interval>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            state: StopwatchState::Idle,
            elapsed_seconds: 0,
            armed_at: None,
            timer: None,
        }
    }

    /// Idle -> Running. No-op from any other state.
    pub fn start(&mut self) {
        if self.state != StopwatchState::Idle {
            return;
        }
        self.state = StopwatchState::Running;
        self.arm();
    }

    /// Running -> Paused. Cancels the timer; elapsed time freezes.
    pub fn pause(&mut self) {
        if self.state != StopwatchState::Running {
            return;
        }
        self.state = StopwatchState::Paused;
        self.disarm();
    }

    /// Paused -> Running, keeping the elapsed count.
    pub fn resume(&mut self) {
        if self.state != StopwatchState::Paused {
            return;
        }
        self.state = StopwatchState::Running;
        self.arm();
    }

    /// Any state -> Idle with the count back at zero.
    pub fn stop(&mut self) {
        self.disarm();
        self.state = StopwatchState::Idle;
        self.elapsed_seconds = 0;
    }

    /// Wait for the next one-second tick and count it.
    ///
    /// Never resolves unless running. Cancel safe: a tick is only counted
    /// when this future completes.
    pub async fn next_tick(&mut self) -> i64 {
        let Some(armed_at) = self.armed_at else {
            return std::future::pending().await;
        };

        let timer = self.timer.get_or_insert_with(|| {
            let mut timer = time::interval_at(armed_at + TICK_PERIOD, TICK_PERIOD);
            timer.set_missed_tick_behavior(MissedTickBehavior::Burst);
            timer
        });
        timer.tick().await;
        self.tick()
    }

    /// Count one elapsed second if running, returning the new total.
    pub fn tick(&mut self) -> i64 {
        if self.state == StopwatchState::Running {
            self.elapsed_seconds += 1;
        }
        self.elapsed_seconds
    }

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != StopwatchState::Idle
    }

    pub fn is_paused(&self) -> bool {
        self.state == StopwatchState::Paused
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed_seconds
    }

    /// `HH:MM:SS`
    pub fn formatted(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }

    /// First tick one period from now; any old handle is dropped
    fn arm(&mut self) {
        self.timer = None;
        self.armed_at = Some(Instant::now());
    }

    fn disarm(&mut self) {
        self.timer = None;
        self.armed_at = None;
    }

    #[cfg(test)]
    fn has_timer(&self) -> bool {
        self.armed_at.is_some()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-padded `HH:MM:SS`, wrapping every 24 hours
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.rem_euclid(24 * 3600);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
