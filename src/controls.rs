// src/controls.rs
//! User controls and keyboard input

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Start, pause or resume, depending on where the stopwatch is
    Toggle,
    /// Pause recording and the stopwatch
    Pause,
    /// Clear the trip and stop the stopwatch
    Clear,
    Quit,
}

impl Control {
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Control::Quit),
            KeyCode::Char(' ') | KeyCode::Enter => Some(Control::Toggle),
            KeyCode::Char('s') | KeyCode::Char('p') => Some(Control::Pause),
            KeyCode::Char('c') => Some(Control::Clear),
            KeyCode::Char('q') | KeyCode::Esc => Some(Control::Quit),
            _ => None,
        }
    }
}

/// Read keys on a blocking thread and forward them as controls.
///
/// The thread exits after forwarding `Quit`, when `running` goes false,
/// or when the receiver is dropped.
pub fn spawn_key_reader(tx: mpsc::Sender<Control>, running: Arc<AtomicBool>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while running.load(Ordering::Relaxed) {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!(error = %e, "keyboard polling failed");
                    break;
                }
            }

            let control = match event::read() {
                Ok(Event::Key(key)) => Control::from_key(&key),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "keyboard read failed");
                    break;
                }
            };

            if let Some(control) = control {
                if tx.blocking_send(control).is_err() || control == Control::Quit {
                    break;
                }
            }
        }
    })
}
