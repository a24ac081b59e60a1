//! Configuration for logria.
//!
//! Handles:
//! - Data root resolution (`~/.logria`, overridable by environment)
//! - Saved parser/session/history paths
//! - Poll rate bounds and runtime toggles
//!
//! There are no process-wide singletons: a [`Config`] is built once in `main`
//! and threaded through construction of everything that needs it.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LogriaError, Result};

/// Environment variable overriding the data root directory name.
pub const ROOT_ENV: &str = "LOGRIA_ROOT";

/// Environment variable that disables home-directory resolution entirely.
/// When set, the data root is relative to the working directory.
pub const DISABLE_HOME_ENV: &str = "LOGRIA_DISABLE_USER_HOME";

/// Default data root directory name under the user's home.
pub const DEFAULT_ROOT: &str = ".logria";

/// Fastest allowed poll rate. Fast enough for smooth typing, 10 kHz.
pub const FASTEST_POLL_RATE: Duration = Duration::from_micros(100);

/// Slowest allowed poll rate, 10 Hz.
pub const SLOWEST_POLL_RATE: Duration = Duration::from_millis(100);

/// Filename of the history tape cache.
pub const HISTORY_TAPE_NAME: &str = "tape";

/// Commands never recorded on the history tape.
pub const HISTORY_EXCLUDES: [&str; 2] = [":history", ":history off"];

/// How many of the most frequent values a Count accumulator reports.
pub const ANALYTICS_TOP_K: usize = 5;

/// Banner shown when the app starts without a stream.
pub const START_MESSAGES: [&str; 4] = [
    "Enter a new command to open and save a new stream,",
    "or enter a number to choose a saved session from the list,",
    "or enter `:config` to configure.",
    "Enter `:q` to quit.",
];

/// Banner shown on entry to configuration mode.
pub const CONFIG_START_MESSAGES: [&str; 2] = [
    "To configure new parameters, enter `session` or `parser`.",
    "Enter `:q` to quit.",
];

/// Prompts for the session creation flow.
pub const CREATE_SESSION_START: &str = "To create a session, enter a type, either `command` or `file`:";
/// Prompt asking for a command to open pipes to.
pub const SESSION_ADD_COMMAND: &str = "Enter a command to open pipes to:";
/// Prompt asking whether to save or keep adding commands.
pub const SESSION_SHOULD_CONTINUE_COMMAND: &str =
    "Enter :s to save or press enter to add another command";
/// Prompt asking for a file path.
pub const SESSION_ADD_FILE: &str = "Enter a path to a file:";
/// Prompt asking whether to save or keep adding files.
pub const SESSION_SHOULD_CONTINUE_FILE: &str =
    "Enter :s to save or press enter to add another file";
/// Prompt asking for a session name.
pub const SAVE_CURRENT_SESSION: &str = "Enter a name to save the session:";

/// Prompts for the parser creation flow.
pub const CREATE_PARSER_START: &str = "To create a parser, enter a type, either `regex` or `split`:";
/// Prompt asking for a parser name.
pub const PARSER_SET_NAME: &str = "Enter a name for the parser:";
/// Prompt asking for an example line.
pub const PARSER_SET_EXAMPLE: &str = "Enter an example string to match against:";
/// Prompt asking for the pattern.
pub const PARSER_SET_PATTERN: &str = "Enter a regex pattern:";
/// Prompt confirming a parser save.
pub const SAVE_CURRENT_PARSER: &str = "Press enter to save or type `:q` to quit:";

/// Runtime configuration, built from CLI flags and the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for saved parsers, sessions, and history.
    root: PathBuf,
    /// Whether the history tape persists to disk.
    pub history_cache: bool,
    /// Whether the main loop adapts its poll rate to the message rate.
    pub smart_poll: bool,
    /// How many top values a Count accumulator renders.
    pub analytics_top_k: usize,
}

impl Config {
    /// Build a configuration from the environment.
    ///
    /// The data root is `~/.logria` unless [`ROOT_ENV`] overrides the
    /// directory name or [`DISABLE_HOME_ENV`] disables home resolution.
    pub fn from_env(history_cache: bool, smart_poll: bool) -> Result<Self> {
        let root_name = std::env::var(ROOT_ENV).unwrap_or_else(|_| DEFAULT_ROOT.to_string());
        let root = if std::env::var_os(DISABLE_HOME_ENV).is_some() {
            PathBuf::from(root_name)
        } else {
            let home = dirs::home_dir().ok_or_else(|| LogriaError::Config {
                message: "cannot determine home directory".to_string(),
            })?;
            home.join(root_name)
        };
        Ok(Self {
            root,
            history_cache,
            smart_poll,
            analytics_top_k: ANALYTICS_TOP_K,
        })
    }

    /// Build a configuration rooted at an explicit directory. Used by tests.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            history_cache: false,
            smart_poll: true,
            analytics_top_k: ANALYTICS_TOP_K,
        }
    }

    /// The data root directory.
    #[must_use]
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Directory holding saved parser records.
    #[must_use]
    pub fn patterns_dir(&self) -> PathBuf {
        self.root.join("patterns")
    }

    /// Directory holding saved session records.
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    /// Directory holding the history tape.
    #[must_use]
    pub fn history_dir(&self) -> PathBuf {
        self.root.join("history")
    }

    /// Path of the history tape cache file.
    #[must_use]
    pub fn history_tape_path(&self) -> PathBuf {
        self.history_dir().join(HISTORY_TAPE_NAME)
    }

    /// Path of the session log file written by the tracing subscriber.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.root.join("logria.log")
    }

    /// Create the data root and its subdirectories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            self.root.clone(),
            self.patterns_dir(),
            self.sessions_dir(),
            self.history_dir(),
        ] {
            std::fs::create_dir_all(&dir)
                .map_err(|e| LogriaError::io(format!("Failed to create {}", dir.display()), e))?;
        }
        Ok(())
    }

    /// Clamp a requested poll rate into the supported range.
    #[must_use]
    pub fn clamp_poll_rate(rate: Duration) -> Duration {
        rate.clamp(FASTEST_POLL_RATE, SLOWEST_POLL_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_root() {
        let config = Config::with_root("/tmp/logria-test");
        assert_eq!(config.patterns_dir(), PathBuf::from("/tmp/logria-test/patterns"));
        assert_eq!(config.sessions_dir(), PathBuf::from("/tmp/logria-test/sessions"));
        assert_eq!(
            config.history_tape_path(),
            PathBuf::from("/tmp/logria-test/history/tape")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path().join("root"));
        config.ensure_dirs().unwrap();
        assert!(config.patterns_dir().is_dir());
        assert!(config.sessions_dir().is_dir());
        assert!(config.history_dir().is_dir());
    }

    #[test]
    fn test_clamp_poll_rate() {
        assert_eq!(
            Config::clamp_poll_rate(Duration::from_secs(10)),
            SLOWEST_POLL_RATE
        );
        assert_eq!(Config::clamp_poll_rate(Duration::ZERO), FASTEST_POLL_RATE);
        let mid = Duration::from_millis(1);
        assert_eq!(Config::clamp_poll_rate(mid), mid);
    }
}
