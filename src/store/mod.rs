//! Per-channel message buffers.
//!
//! Every source emits on two logical channels, stdout and stderr. Lines from
//! all active sources are merged per channel in the order the main loop
//! drains them. Buffers are append-only for the life of a session; `:restart`
//! replaces the whole store.

use std::fmt;

/// One of the two logical output channels of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Standard output.
    Out,
    /// Standard error.
    Err,
}

impl Channel {
    /// The other channel.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Out => Self::Err,
            Self::Err => Self::Out,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Out => write!(f, "stdout"),
            Self::Err => write!(f, "stderr"),
        }
    }
}

/// Append-only line buffers for both channels, merged across sources.
///
/// Indices are permanent once a line is appended; the filter index and the
/// parser cursors rely on that.
#[derive(Debug, Default)]
pub struct MessageStore {
    stdout: Vec<String>,
    stderr: Vec<String>,
}

impl MessageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffer for a channel.
    #[must_use]
    pub fn buffer(&self, channel: Channel) -> &[String] {
        match channel {
            Channel::Out => &self.stdout,
            Channel::Err => &self.stderr,
        }
    }

    /// Number of lines buffered on a channel.
    #[must_use]
    pub fn len(&self, channel: Channel) -> usize {
        self.buffer(channel).len()
    }

    /// Whether a channel has never produced a line.
    #[must_use]
    pub fn is_empty(&self, channel: Channel) -> bool {
        self.buffer(channel).is_empty()
    }

    /// Append a line to a channel.
    pub fn push(&mut self, channel: Channel, line: String) {
        match channel {
            Channel::Out => self.stdout.push(line),
            Channel::Err => self.stderr.push(line),
        }
    }

    /// Buffer to drain into. Only the main loop holds this.
    pub fn buffer_mut(&mut self, channel: Channel) -> &mut Vec<String> {
        match channel {
            Channel::Out => &mut self.stdout,
            Channel::Err => &mut self.stderr,
        }
    }

    /// Drop every buffered line on both channels. Used by `:restart`.
    pub fn clear(&mut self) {
        self.stdout.clear();
        self.stderr.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_are_independent() {
        let mut store = MessageStore::new();
        store.push(Channel::Out, "a".to_string());
        store.push(Channel::Err, "b".to_string());
        store.push(Channel::Err, "c".to_string());

        assert_eq!(store.len(Channel::Out), 1);
        assert_eq!(store.len(Channel::Err), 2);
        assert_eq!(store.buffer(Channel::Err), ["b", "c"]);
    }

    #[test]
    fn test_clear_empties_both() {
        let mut store = MessageStore::new();
        store.push(Channel::Out, "a".to_string());
        store.push(Channel::Err, "b".to_string());
        store.clear();
        assert!(store.is_empty(Channel::Out));
        assert!(store.is_empty(Channel::Err));
    }

    #[test]
    fn test_other_channel() {
        assert_eq!(Channel::Out.other(), Channel::Err);
        assert_eq!(Channel::Err.other(), Channel::Out);
    }
}
