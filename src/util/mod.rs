//! Shared utilities.
//!
//! - Atomic file writes for saved records
//! - Resolution of operator-typed commands and paths

pub mod resolver;

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{LogriaError, Result};

/// Atomically write content to a file.
///
/// Writes to a temporary file in the same directory, flushes it, then renames
/// it over the target. If any step fails the original file is unchanged.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let parent = path.parent().ok_or_else(|| LogriaError::Io {
        context: format!("Cannot determine parent directory for: {}", path.display()),
        source: io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
    })?;

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            LogriaError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    // Same directory ensures the rename stays on one filesystem
    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        LogriaError::io(
            format!("Failed to create temporary file in: {}", parent.display()),
            e,
        )
    })?;

    temp_file.write_all(content).map_err(|e| {
        LogriaError::io(
            format!("Failed to write to temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.flush().map_err(|e| {
        LogriaError::io(format!("Failed to flush temporary file for: {}", path.display()), e)
    })?;

    temp_file.persist(path).map_err(|e| {
        LogriaError::io(format!("Failed to atomically write file: {}", path.display()), e.error)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");

        atomic_write(&path, b"Hello, world!").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("test.txt");

        atomic_write(&path, b"Nested content").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replace.txt");

        std::fs::write(&path, "old").unwrap();
        atomic_write(&path, b"new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
