//! logria: an interactive terminal log stream viewer.
//!
//! Logria ingests one or more live text streams (subprocess stdout/stderr or
//! files), buffers every line, and lets an operator pivot the view in real
//! time through regex filters, user-defined parsers, and rolling analytics
//! computed over parsed fields.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`stream`]: Sources that produce lines on two channels from a child
//!   process or a file
//! - [`store`]: Append-only per-channel message buffers
//! - [`filter`]: Incremental regex filter index over a buffer
//! - [`parser`]: User-defined projections from a line to field strings
//! - [`analytics`]: Rolling per-field accumulators and their summary
//! - [`history`]: The operator's input history tape
//! - [`session`]: Saved stream sessions
//! - [`commands`]: The colon-command mini-language and interactive flows
//! - [`tui`]: The view controller, command line, and main loop
//! - [`ansi`]: Color escape stripping and styling
//! - [`config`]: Paths, tunables, and runtime toggles
//! - [`error`]: Error types and handling
//!
//! # Data flow
//!
//! Sources feed per-channel buffers; the filter index, parser, and analytics
//! stages derive from the buffers incrementally between main-loop iterations.
//! The view controller renders whichever stage is active and repaints only
//! when the visible range or content changed.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analytics;
pub mod ansi;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod parser;
pub mod session;
pub mod store;
pub mod stream;
pub mod tui;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{LogriaError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
