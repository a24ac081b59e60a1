//! Error types for logria.
//!
//! This module provides crate-wide error handling following the thiserror
//! pattern. Per-line problems in the stream pipeline never surface here; they
//! are quarantined to the line that caused them (skipped, or echoed as a
//! synthetic message). These types cover the failures that abort an operation:
//! activation of a bad pattern, broken saved state, terminal setup, I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for logria operations.
#[derive(Error, Debug)]
pub enum LogriaError {
    /// A regex pattern failed to compile.
    #[error("Invalid regex /{pattern}/: {source}")]
    InvalidRegex {
        /// The pattern as the user typed it.
        pattern: String,
        /// Underlying regex compile error.
        #[source]
        source: Box<regex::Error>,
    },

    /// A parser definition could not be constructed or validated.
    #[error("Invalid parser {name:?}: {reason}")]
    InvalidParser {
        /// Name of the offending parser.
        name: String,
        /// Reason the definition was rejected.
        reason: String,
    },

    /// A saved record (parser or session) could not be found.
    #[error("No saved record named {name:?} in {dir}")]
    RecordNotFound {
        /// Record name that was requested.
        name: String,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// Serialization or deserialization of a saved record failed.
    #[error("Serialization error: {context}")]
    Serialization {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// I/O error with context.
    #[error("I/O error: {context}")]
    Io {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Terminal setup or teardown failed.
    #[error("Terminal error: {context}")]
    Terminal {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error from the terminal backend.
        #[source]
        source: std::io::Error,
    },

    /// Stdin is not an interactive terminal.
    #[error("Piping is not supported")]
    PipedInput,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Shutdown requested by the operator.
    #[error("Operation interrupted")]
    Interrupted,
}

impl LogriaError {
    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a new terminal error with context.
    #[must_use]
    pub fn terminal(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Terminal {
            context: context.into(),
            source,
        }
    }

    /// Create a new regex compile error.
    #[must_use]
    pub fn regex(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            source: Box::new(source),
        }
    }

    /// Create a new serialization error with context.
    #[must_use]
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::PipedInput => 2,
            Self::Config { .. } => 5,
            Self::Io { .. } => 74,
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

/// Result type alias for logria operations.
pub type Result<T> = std::result::Result<T, LogriaError>;

impl From<std::io::Error> for LogriaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for LogriaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(LogriaError::PipedInput.exit_code(), 2);
        assert_eq!(
            LogriaError::Config {
                message: "bad".to_string()
            }
            .exit_code(),
            5
        );
        assert_eq!(LogriaError::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_regex_error_display() {
        let err = regex::Regex::new("[unclosed").unwrap_err();
        let wrapped = LogriaError::regex("[unclosed", err);
        assert!(wrapped.to_string().contains("[unclosed"));
    }
}
