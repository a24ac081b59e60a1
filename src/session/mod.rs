//! Saved stream sessions.
//!
//! A session records how to reopen a set of streams: either a list of argvs
//! to spawn or a list of file paths (as path segments). Sessions are saved as
//! human-editable JSON under the configured sessions directory:
//!
//! ```json
//! {
//!     "type": "command",
//!     "commands": [["python", "demo/generate_test_logs.py"]]
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{LogriaError, Result};
use crate::stream::{CommandInput, FileInput, InputStream};
use crate::util::atomic_write;

/// What kind of streams a session opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Each entry is an argv to spawn.
    Command,
    /// Each entry is a file path split into segments.
    File,
}

/// The on-disk shape of a session, exactly as serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// What kind of streams the entries describe.
    #[serde(rename = "type")]
    pub kind: SessionKind,
    /// One inner list per stream: an argv, or path segments.
    pub commands: Vec<Vec<String>>,
}

impl SessionRecord {
    /// Build the sources this session describes. Nothing is started.
    #[must_use]
    pub fn build_streams(&self) -> Vec<Box<dyn InputStream>> {
        self.commands
            .iter()
            .map(|entry| -> Box<dyn InputStream> {
                match self.kind {
                    SessionKind::Command => Box::new(CommandInput::new(entry.clone())),
                    SessionKind::File => Box::new(FileInput::new(entry.clone())),
                }
            })
            .collect()
    }
}

/// Storage for saved session records.
#[derive(Debug)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Storage rooted at the configured sessions directory.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.sessions_dir(),
        }
    }

    /// Names of every saved session, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// The session listing formatted for the setup screen, numbered from 1.
    #[must_use]
    pub fn numbered(&self) -> Vec<String> {
        self.list()
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}: {name}", i + 1))
            .collect()
    }

    /// Load a saved session.
    pub fn load(&self, name: &str) -> Result<SessionRecord> {
        let path = self.dir.join(name);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogriaError::RecordNotFound {
                    name: name.to_string(),
                    dir: self.dir.clone(),
                }
            } else {
                LogriaError::io(format!("Failed to read {}", path.display()), e)
            }
        })?;
        serde_json::from_str(&content)
            .map_err(|e| LogriaError::serialization(format!("Failed to parse {}", path.display()), e))
    }

    /// Save a session under a name. Slashes in the name are replaced so the
    /// name stays a single path component.
    pub fn save(&self, name: &str, record: &SessionRecord) -> Result<()> {
        let safe_name = name.replace('/', "|");
        let content = serde_json::to_string_pretty(record)
            .map_err(|e| LogriaError::serialization(format!("Failed to serialize {safe_name}"), e))?;
        atomic_write(self.dir.join(safe_name), content.as_bytes())
    }

    /// Delete a saved session.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        std::fs::remove_file(&path)
            .map_err(|e| LogriaError::io(format!("Failed to remove {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path());
        config.ensure_dirs().unwrap();
        let store = SessionStore::new(&config);
        (dir, store)
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, store) = store();
        let record = SessionRecord {
            kind: SessionKind::Command,
            commands: vec![vec!["echo".to_string(), "hello".to_string()]],
        };

        store.save("Cmd - echo hello", &record).unwrap();
        let loaded = store.load("Cmd - echo hello").unwrap();

        assert_eq!(loaded, record);
        // JSON also round-trips byte for byte
        let json = serde_json::to_string_pretty(&record).unwrap();
        assert_eq!(serde_json::to_string_pretty(&loaded).unwrap(), json);
    }

    #[test]
    fn test_file_session_round_trip() {
        let (_dir, store) = store();
        let record = SessionRecord {
            kind: SessionKind::File,
            commands: vec![vec!["var".to_string(), "log".to_string(), "syslog".to_string()]],
        };
        store.save("File - syslog", &record).unwrap();
        assert_eq!(store.load("File - syslog").unwrap(), record);
    }

    #[test]
    fn test_numbered_listing_is_one_based() {
        let (_dir, store) = store();
        let record = SessionRecord {
            kind: SessionKind::Command,
            commands: vec![vec!["a".to_string()]],
        };
        store.save("alpha", &record).unwrap();
        store.save("beta", &record).unwrap();

        assert_eq!(store.numbered(), ["1: alpha", "2: beta"]);
    }

    #[test]
    fn test_slashes_sanitized_in_names() {
        let (_dir, store) = store();
        let record = SessionRecord {
            kind: SessionKind::File,
            commands: vec![vec!["tmp".to_string(), "x".to_string()]],
        };
        store.save("File - /tmp/x", &record).unwrap();
        assert_eq!(store.list(), ["File - |tmp|x"]);
    }

    #[test]
    fn test_remove_missing_errors() {
        let (_dir, store) = store();
        assert!(store.remove("nope").is_err());
    }

    #[test]
    fn test_build_streams_matches_kind() {
        let record = SessionRecord {
            kind: SessionKind::Command,
            commands: vec![vec!["echo".to_string(), "x".to_string()], vec!["echo".to_string()]],
        };
        assert_eq!(record.build_streams().len(), 2);
    }
}
