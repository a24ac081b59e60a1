//! The command mini-language.
//!
//! Colon-prefixed commands submitted from the command line are dispatched
//! here and applied to the engine. Slash-prefixed regex activation lives in
//! the engine itself; the interactive multi-step flows (setup, parser
//! selection, configuration) live in their submodules.

pub mod config;
pub mod parser_select;
pub mod setup;

use std::time::Duration;

use crate::tui::app::Logria;

/// Apply a colon command to the engine. Unknown commands are ignored.
pub fn handle_command(app: &mut Logria, command: &str) {
    tracing::debug!(command, "dispatching command");
    if command == ":q" {
        app.exit_requested = true;
    } else if let Some(rest) = command.strip_prefix(":poll") {
        if let Ok(seconds) = rest.trim().parse::<f64>() {
            if seconds.is_finite() && seconds >= 0.0 {
                app.set_poll_rate(Duration::from_secs_f64(seconds));
            }
        }
        // Invalid numbers are ignored silently
    } else if command == ":config" {
        config::enter(app);
    } else if command == ":history off" {
        app.end_history_mode();
    } else if let Some(rest) = command.strip_prefix(":history") {
        let n = rest.trim().parse::<usize>().unwrap_or_else(|_| app.output_rows());
        app.start_history_mode(n);
    } else if command == ":restart" {
        app.restart();
    }
}

/// Resolve a `:r` delete specification into the 1-based indices to delete.
///
/// The specification is a comma-separated list of tokens, each an integer or
/// an `a-b` inclusive range. Invalid tokens are skipped; a reversed range
/// contributes only its first number. The result is the de-duplicated union
/// in ascending order.
#[must_use]
pub fn resolve_delete_command(command: &str) -> Vec<usize> {
    let spec = command.trim_start_matches(":r").trim();
    let mut indices: Vec<usize> = Vec::new();
    for token in spec.split(',') {
        if let Some((first, second)) = token.split_once('-') {
            let (Ok(start), Ok(end)) = (first.trim().parse::<usize>(), second.trim().parse::<usize>())
            else {
                continue;
            };
            if start <= end {
                indices.extend(start..=end);
            } else {
                indices.push(start);
            }
        } else if let Ok(index) = token.trim().parse::<usize>() {
            indices.push(index);
        }
    }
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Map resolved 1-based indices onto a name listing, returning the names to
/// delete. Out-of-range indices are ignored.
#[must_use]
pub fn names_for_indices(names: &[String], indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .filter_map(|&i| i.checked_sub(1).and_then(|i| names.get(i)).cloned())
        .collect()
}
