//! Resolution of operator-typed commands and file paths.
//!
//! When the operator types a command like `python script.py`, the spawned
//! child does not get a login shell, so bare program names are resolved
//! against `PATH` and `~`/`$HOME` are expanded up front.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolves program names to fully qualified paths using the `PATH`
/// environment variable captured at construction time.
#[derive(Debug)]
pub struct Resolver {
    paths: HashMap<String, String>,
    user_home: String,
}

impl Resolver {
    /// Build a resolver by scanning every directory on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        let user_home = dirs::home_dir()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut resolver = Self {
            paths: HashMap::new(),
            user_home,
        };
        resolver.scan_path();
        resolver
    }

    /// Fill the lookup table from `PATH`. Directories that do not exist are
    /// skipped; later entries on `PATH` lose to earlier ones, so iteration
    /// runs in reverse.
    fn scan_path(&mut self) {
        let Some(path_var) = std::env::var_os("PATH") else {
            tracing::info!("PATH environment variable does not exist");
            return;
        };
        let dirs: Vec<PathBuf> = std::env::split_paths(&path_var).collect();
        for dir in dirs.iter().rev() {
            let dir = PathBuf::from(self.expand_home(&dir.to_string_lossy()));
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                if let Ok(name) = entry.file_name().into_string() {
                    let full = dir.join(&name).to_string_lossy().into_owned();
                    self.paths.insert(name, full);
                }
            }
        }
    }

    /// Get a program's fully qualified path, or the input unchanged when it
    /// is not on `PATH`.
    #[must_use]
    pub fn get(&self, program: &str) -> String {
        self.paths
            .get(program)
            .cloned()
            .unwrap_or_else(|| program.to_string())
    }

    /// Expand `~` and `$HOME` to the user's home directory.
    #[must_use]
    pub fn expand_home(&self, part: &str) -> String {
        if part.contains('~') {
            part.replace('~', &self.user_home)
        } else if part.contains("$HOME") {
            part.replace("$HOME", &self.user_home)
        } else {
            part.to_string()
        }
    }

    /// Resolve a typed command into an argv, qualifying each token.
    #[must_use]
    pub fn resolve_command(&self, command: &str) -> Vec<String> {
        command
            .split(' ')
            .map(|part| self.expand_home(&self.get(part)))
            .collect()
    }

    /// Resolve a typed file path into its path segments.
    #[must_use]
    pub fn resolve_file(&self, filepath: &str) -> Vec<String> {
        filepath.split('/').map(|p| self.expand_home(p)).collect()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Join path segments back into a single path.
#[must_use]
pub fn join_segments(segments: &[String]) -> PathBuf {
    let joined = segments.join("/");
    Path::new(&joined).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_program_passes_through() {
        let resolver = Resolver::new();
        assert_eq!(resolver.get("definitely-not-a-real-tool-xyz"), "definitely-not-a-real-tool-xyz");
    }

    #[test]
    fn test_expand_home_tilde() {
        let resolver = Resolver::new();
        let expanded = resolver.expand_home("~/logs/app.log");
        assert!(!expanded.starts_with('~') || resolver.user_home.is_empty());
    }

    #[test]
    fn test_resolve_command_splits_on_spaces() {
        let resolver = Resolver::new();
        let argv = resolver.resolve_command("no-such-program-abc --flag value");
        assert_eq!(argv.len(), 3);
        assert_eq!(argv[1], "--flag");
        assert_eq!(argv[2], "value");
    }

    #[test]
    fn test_resolve_file_segments() {
        let resolver = Resolver::new();
        let segments = resolver.resolve_file("var/log/syslog");
        assert_eq!(segments, vec!["var", "log", "syslog"]);
    }

    #[test]
    fn test_join_segments() {
        let segments = vec!["var".to_string(), "log".to_string(), "syslog".to_string()];
        assert_eq!(join_segments(&segments), PathBuf::from("var/log/syslog"));
    }
}
