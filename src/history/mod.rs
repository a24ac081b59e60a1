//! Operator input history.
//!
//! The history tape is an ordered list of commands the operator has
//! submitted, de-duplicated against the most recent entry, with a cursor for
//! up/down recall inside the command line. It optionally persists one command
//! per line to a cache file and reloads it on startup with the cursor parked
//! at the end.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::config::{Config, HISTORY_EXCLUDES};
use crate::error::{LogriaError, Result};

/// Ordered store of past command strings with a recall cursor.
#[derive(Debug)]
pub struct HistoryTape {
    items: Vec<String>,
    cursor: usize,
    /// The first scroll-back after an append parks on the last item instead
    /// of moving past it.
    should_scroll_back: bool,
    cache_path: Option<PathBuf>,
}

impl HistoryTape {
    /// Build a tape, loading the cache file when the configuration enables
    /// history persistence.
    pub fn new(config: &Config) -> Result<Self> {
        let mut tape = Self::in_memory();
        if config.history_cache {
            let path = config.history_tape_path();
            tape.cache_path = Some(path.clone());
            if path.is_file() {
                let file = std::fs::File::open(&path)
                    .map_err(|e| LogriaError::io(format!("Failed to read {}", path.display()), e))?;
                tape.items = BufReader::new(file).lines().map_while(|l| l.ok()).collect();
                tape.cursor = tape.items.len().saturating_sub(1);
            }
        }
        Ok(tape)
    }

    /// Build an empty tape with no persistence.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            should_scroll_back: false,
            cache_path: None,
        }
    }

    /// Number of items on the tape.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the tape holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item under the cursor, or an empty string on a fresh tape.
    #[must_use]
    pub fn current(&self) -> String {
        self.items.get(self.cursor).cloned().unwrap_or_default()
    }

    /// Whether the cursor sits on the newest item.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.items.is_empty() || self.cursor == self.items.len() - 1
    }

    /// Move the cursor to `index`, clamped to the tape.
    pub fn go_to(&mut self, index: usize) -> String {
        if !self.items.is_empty() {
            self.cursor = index.min(self.items.len() - 1);
        }
        self.current()
    }

    /// The last `n` items in order.
    #[must_use]
    pub fn tail(&self, n: usize) -> Vec<String> {
        let start = self.items.len().saturating_sub(n);
        self.items[start..].to_vec()
    }

    /// Append an item.
    ///
    /// Leading and trailing spaces are trimmed. Items in the excluded set and
    /// repeats of the newest item are dropped.
    pub fn add(&mut self, item: &str) {
        let clean = item.trim();
        if clean.is_empty() || HISTORY_EXCLUDES.contains(&clean) {
            return;
        }
        if self.items.last().is_some_and(|last| last == clean) {
            return;
        }
        self.append_to_cache(clean);
        self.items.push(clean.to_string());
        self.cursor = self.items.len() - 1;
        self.should_scroll_back = false;
    }

    /// Move the cursor one step toward older items and return what it lands
    /// on. The first call after an append parks on the newest item.
    pub fn scroll_back(&mut self) -> String {
        if !self.items.is_empty() {
            if self.should_scroll_back {
                self.cursor = self.cursor.saturating_sub(1);
            } else {
                self.should_scroll_back = true;
            }
        }
        self.current()
    }

    /// Move the cursor one step toward newer items. Past the end returns an
    /// empty string.
    pub fn scroll_forward(&mut self) -> String {
        if self.at_end() {
            return String::new();
        }
        self.cursor = (self.cursor + 1).min(self.items.len() - 1);
        self.current()
    }

    fn append_to_cache(&self, item: &str) {
        let Some(path) = &self.cache_path else {
            return;
        };
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| writeln!(f, "{item}"));
        if let Err(e) = appended {
            tracing::warn!(path = %path.display(), error = %e, "failed to append history tape");
        }
    }
}
