//! Stream sources.
//!
//! A source produces lines asynchronously on two logical channels, stdout and
//! stderr. Each concrete source runs its readers on dedicated OS threads and
//! hands lines to the main loop through per-channel queues; the main loop
//! drains with a non-blocking receive, so producers can never stall it.
//!
//! Failure to start a source is not fatal: the error is enqueued as a
//! synthetic line on the stderr channel and the engine keeps running.

pub mod command;
pub mod file;

pub use command::CommandInput;
pub use file::FileInput;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use crate::store::Channel;

/// Capability set every source provides.
///
/// `start` begins asynchronous production; `drain` moves whatever has been
/// produced so far into a buffer; `set_poll_rate` adjusts the pacing knob
/// (observed eventually by the readers, not transactionally); `terminate`
/// stops production, killing any child process and joining the readers.
pub trait InputStream: Send {
    /// Human-readable name of the source.
    fn name(&self) -> &str;

    /// Begin asynchronous production of lines.
    fn start(&mut self);

    /// Move every line produced so far on `channel` into `into`.
    ///
    /// Returns the number of lines moved. Never blocks.
    fn drain(&mut self, channel: Channel, into: &mut Vec<String>) -> usize;

    /// Adjust the reader pacing knob.
    fn set_poll_rate(&self, rate: Duration);

    /// Stop production and release every resource the source holds.
    fn terminate(&mut self);
}

/// Shared plumbing between the reader threads and the drain side.
pub(crate) struct StreamShared {
    /// Poll rate in microseconds; written by the main loop, read by readers.
    pub poll_rate: AtomicU64,
    /// Cleared by `terminate` to ask readers to stop early.
    pub running: AtomicBool,
}

impl StreamShared {
    pub(crate) fn new(poll_rate: Duration) -> Arc<Self> {
        Arc::new(Self {
            poll_rate: AtomicU64::new(poll_rate.as_micros() as u64),
            running: AtomicBool::new(true),
        })
    }

    pub(crate) fn poll_rate(&self) -> Duration {
        Duration::from_micros(self.poll_rate.load(Ordering::Relaxed))
    }

    pub(crate) fn set_poll_rate(&self, rate: Duration) {
        self.poll_rate
            .store(rate.as_micros() as u64, Ordering::Relaxed);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub(crate) fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Drain a receiver without blocking.
pub(crate) fn drain_receiver(rx: &Receiver<String>, into: &mut Vec<String>) -> usize {
    let mut moved = 0;
    loop {
        match rx.try_recv() {
            Ok(line) => {
                into.push(line);
                moved += 1;
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
        }
    }
    moved
}

/// Enqueue a synthetic error line, ignoring a closed queue.
pub(crate) fn send_synthetic(tx: &Sender<String>, message: String) {
    let _ = tx.send(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_drain_receiver_moves_everything() {
        let (tx, rx) = mpsc::channel();
        tx.send("a".to_string()).unwrap();
        tx.send("b".to_string()).unwrap();

        let mut out = Vec::new();
        let moved = drain_receiver(&rx, &mut out);

        assert_eq!(moved, 2);
        assert_eq!(out, ["a", "b"]);
    }

    #[test]
    fn test_drain_receiver_empty() {
        let (_tx, rx) = mpsc::channel::<String>();
        let mut out = Vec::new();
        assert_eq!(drain_receiver(&rx, &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_shared_poll_rate_round_trip() {
        let shared = StreamShared::new(Duration::from_millis(1));
        assert_eq!(shared.poll_rate(), Duration::from_millis(1));
        shared.set_poll_rate(Duration::from_micros(250));
        assert_eq!(shared.poll_rate(), Duration::from_micros(250));
    }
}
