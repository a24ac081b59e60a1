//! Subprocess-backed stream source.

use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config;
use crate::store::Channel;

use super::{drain_receiver, send_synthetic, InputStream, StreamShared};

/// A source that spawns a child process and streams both of its output
/// handles, one reader thread per handle.
///
/// Lines arrive in FIFO order per handle; there is no ordering guarantee
/// between the two channels. The source is done when both handles hit
/// end-of-stream, which also covers the child dying unexpectedly.
pub struct CommandInput {
    name: String,
    argv: Vec<String>,
    shared: Arc<StreamShared>,
    out_rx: Receiver<String>,
    err_rx: Receiver<String>,
    out_tx: Option<Sender<String>>,
    err_tx: Option<Sender<String>>,
    child: Option<Child>,
    readers: Vec<JoinHandle<()>>,
}

impl CommandInput {
    /// Create a source for an argv. Nothing is spawned until [`start`].
    ///
    /// [`start`]: InputStream::start
    #[must_use]
    pub fn new(argv: Vec<String>) -> Self {
        let (out_tx, out_rx) = mpsc::channel();
        let (err_tx, err_rx) = mpsc::channel();
        Self {
            name: argv.join(" "),
            argv,
            shared: StreamShared::new(config::FASTEST_POLL_RATE),
            out_rx,
            err_rx,
            out_tx: Some(out_tx),
            err_tx: Some(err_tx),
            child: None,
            readers: Vec::new(),
        }
    }

    fn spawn_reader(
        &mut self,
        handle: impl Read + Send + 'static,
        tx: Sender<String>,
    ) {
        let shared = Arc::clone(&self.shared);
        self.readers.push(std::thread::spawn(move || {
            read_lines(handle, &tx, &shared);
        }));
    }
}

/// Read a handle line by line until end-of-stream or a stop request.
///
/// The blocking read is the pacing gate; a read error (for example the child
/// dying between two reads) ends the loop cleanly.
fn read_lines(handle: impl Read, tx: &Sender<String>, shared: &StreamShared) {
    let reader = BufReader::new(handle);
    for line in reader.lines() {
        if !shared.is_running() {
            break;
        }
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

impl InputStream for CommandInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) {
        let (Some(out_tx), Some(err_tx)) = (self.out_tx.take(), self.err_tx.take()) else {
            return; // already started
        };

        let spawned = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(command = %self.name, error = %e, "failed to spawn command");
                send_synthetic(
                    &err_tx,
                    format!("Error opening handle to command `{}`: {e}", self.name),
                );
                return;
            }
        };

        tracing::debug!(command = %self.name, pid = child.id(), "spawned command source");

        if let Some(stdout) = child.stdout.take() {
            self.spawn_reader(stdout, out_tx);
        }
        if let Some(stderr) = child.stderr.take() {
            self.spawn_reader(stderr, err_tx);
        }
        self.child = Some(child);
    }

    fn drain(&mut self, channel: Channel, into: &mut Vec<String>) -> usize {
        match channel {
            Channel::Out => drain_receiver(&self.out_rx, into),
            Channel::Err => drain_receiver(&self.err_rx, into),
        }
    }

    fn set_poll_rate(&self, rate: Duration) {
        self.shared.set_poll_rate(rate);
    }

    fn terminate(&mut self) {
        self.shared.stop();
        if let Some(mut child) = self.child.take() {
            // Kill closes the pipes, which unblocks the readers at EOF
            let _ = child.kill();
            let _ = child.wait();
        }
        for reader in self.readers.drain(..) {
            let _ = reader.join();
        }
        tracing::debug!(command = %self.name, "terminated command source");
    }
}

impl Drop for CommandInput {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn drain_until(
        source: &mut CommandInput,
        channel: Channel,
        expect: usize,
        timeout: Duration,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        let deadline = Instant::now() + timeout;
        while lines.len() < expect && Instant::now() < deadline {
            source.drain(channel, &mut lines);
            std::thread::sleep(Duration::from_millis(1));
        }
        lines
    }

    #[test]
    fn test_echo_lands_on_out_channel() {
        let mut source = CommandInput::new(vec!["echo".to_string(), "hello".to_string()]);
        source.start();

        let lines = drain_until(&mut source, Channel::Out, 1, Duration::from_secs(5));
        assert_eq!(lines, ["hello"]);

        source.terminate();
    }

    #[test]
    fn test_spawn_failure_becomes_synthetic_err_line() {
        let mut source = CommandInput::new(vec!["definitely-not-a-real-tool-xyz".to_string()]);
        source.start();

        let mut lines = Vec::new();
        source.drain(Channel::Err, &mut lines);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("definitely-not-a-real-tool-xyz"));
    }

    #[test]
    fn test_terminate_is_idempotent() {
        let mut source = CommandInput::new(vec!["echo".to_string(), "x".to_string()]);
        source.start();
        source.terminate();
        source.terminate();
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut source = CommandInput::new(vec!["echo".to_string(), "once".to_string()]);
        source.start();
        source.start();

        let lines = drain_until(&mut source, Channel::Out, 1, Duration::from_secs(5));
        assert_eq!(lines, ["once"]);
    }
}
