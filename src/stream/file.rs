//! File-backed stream source.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config;
use crate::store::Channel;

use super::{drain_receiver, send_synthetic, InputStream, StreamShared};

/// How many lines a file reader enqueues before consulting the poll rate.
const LINES_PER_BATCH: usize = 4096;

/// A source that reads a file once, line by line, onto the stdout channel,
/// then finishes. Open and permission errors become synthetic lines on the
/// stderr channel.
pub struct FileInput {
    name: String,
    path: PathBuf,
    shared: Arc<StreamShared>,
    out_rx: Receiver<String>,
    err_rx: Receiver<String>,
    out_tx: Option<Sender<String>>,
    err_tx: Option<Sender<String>>,
    reader: Option<JoinHandle<()>>,
}

impl FileInput {
    /// Create a source for the path assembled from `segments`.
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        let name = segments.join("/");
        let path = PathBuf::from(&name);
        let (out_tx, out_rx) = mpsc::channel();
        let (err_tx, err_rx) = mpsc::channel();
        Self {
            name,
            path,
            shared: StreamShared::new(config::FASTEST_POLL_RATE),
            out_rx,
            err_rx,
            out_tx: Some(out_tx),
            err_tx: Some(err_tx),
            reader: None,
        }
    }
}

/// Enqueue every line of the file, pausing one poll interval per batch so a
/// huge file does not monopolize the queues.
fn read_file(
    path: PathBuf,
    out_tx: &Sender<String>,
    err_tx: &Sender<String>,
    shared: &StreamShared,
) {
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to open file source");
            send_synthetic(
                err_tx,
                format!("Error opening file handle to `{}`: {e}", path.display()),
            );
            return;
        }
    };

    let reader = BufReader::new(file);
    for (count, line) in reader.lines().enumerate() {
        if !shared.is_running() {
            break;
        }
        match line {
            Ok(line) => {
                if out_tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                send_synthetic(err_tx, format!("Error reading `{}`: {e}", path.display()));
                break;
            }
        }
        if count % LINES_PER_BATCH == LINES_PER_BATCH - 1 {
            std::thread::sleep(shared.poll_rate());
        }
    }
}

impl InputStream for FileInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) {
        let (Some(out_tx), Some(err_tx)) = (self.out_tx.take(), self.err_tx.take()) else {
            return; // already started
        };
        let path = self.path.clone();
        let shared = Arc::clone(&self.shared);
        tracing::debug!(path = %path.display(), "starting file source");
        self.reader = Some(std::thread::spawn(move || {
            read_file(path, &out_tx, &err_tx, &shared);
        }));
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
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

impl Drop for FileInput {
    fn drop(&mut self) {
        self.terminate();
    }
}
