//! Keystroke delivery.
//!
//! The main loop reads at most one event per iteration without blocking; the
//! poll-rate sleep at the end of the iteration is the only place it waits.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};

use crate::error::{LogriaError, Result};

/// Events the main loop reacts to.
#[derive(Debug, Clone)]
pub enum Event {
    /// Key press.
    Key(KeyEvent),
    /// Terminal resize to (columns, rows).
    Resize(u16, u16),
}

/// Read one pending event without blocking. Returns `None` when no event is
/// queued. Key releases and repeats from kitty-protocol terminals are
/// filtered to presses only.
pub fn poll_event() -> Result<Option<Event>> {
    if !event::poll(Duration::ZERO)
        .map_err(|e| LogriaError::terminal("Failed to poll for events", e))?
    {
        return Ok(None);
    }
    match event::read().map_err(|e| LogriaError::terminal("Failed to read event", e))? {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(Event::Key(key))),
        CrosstermEvent::Resize(w, h) => Ok(Some(Event::Resize(w, h))),
        _ => Ok(None),
    }
}
