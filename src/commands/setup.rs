//! Stream setup flow.
//!
//! When the app launches without a stream (or after `:restart`), the operator
//! chooses what to watch: a saved session by number, a new command, or a file
//! path. New commands and files are saved as sessions so they can be reopened
//! by number next time.

use std::path::Path;

use crate::config::START_MESSAGES;
use crate::session::{SessionKind, SessionRecord};
use crate::store::Channel;
use crate::stream::{CommandInput, FileInput, InputStream};
use crate::tui::app::{Flow, Logria};
use crate::tui::command_line::InputMode;
use crate::util::resolver::Resolver;

use super::{config, names_for_indices, resolve_delete_command};

/// Enter setup mode: show the banner and the saved session list and start
/// collecting input.
pub fn enter(app: &mut Logria) {
    app.flow = Some(Flow::Setup);
    app.flow_messages = START_MESSAGES.iter().map(|s| (*s).to_string()).collect();
    app.flow_messages.extend(app.session_store.numbered());
    app.input_mode = InputMode::Prompt;
    app.invalidate_render();
}

/// Handle one submitted line of setup input.
pub fn handle(app: &mut Logria, input: &str) {
    if input.is_empty() {
        app.flow = Some(Flow::Setup);
        return;
    }
    if input == ":q" {
        app.exit_requested = true;
        return;
    }
    if input == ":config" {
        config::enter(app);
        return;
    }
    if input.starts_with(":r ") {
        let indices = resolve_delete_command(input);
        let names = app.session_store.list();
        for name in names_for_indices(&names, &indices) {
            if let Err(e) = app.session_store.remove(&name) {
                tracing::warn!(session = %name, error = %e, "failed to remove session");
            }
        }
        enter(app); // re-render the remaining list
        return;
    }

    // A number picks a saved session from the listing
    if let Ok(choice) = input.parse::<usize>() {
        let names = app.session_store.list();
        let Some(name) = choice.checked_sub(1).and_then(|i| names.get(i)) else {
            app.flow = Some(Flow::Setup);
            return;
        };
        match app.session_store.load(name) {
            Ok(record) => finish(app, record.build_streams()),
            Err(e) => {
                app.flow = Some(Flow::Setup);
                app.flow_messages.push(e.to_string());
                app.invalidate_render();
            }
        }
        return;
    }

    let resolver = Resolver::new();
    if Path::new(input).is_file() {
        let segments = resolver.resolve_file(input);
        let record = SessionRecord {
            kind: SessionKind::File,
            commands: vec![segments.clone()],
        };
        save_session(app, &format!("File - {}", input.replace('/', "|")), &record);
        finish(app, vec![Box::new(FileInput::new(segments))]);
    } else {
        let argv = resolver.resolve_command(input);
        let record = SessionRecord {
            kind: SessionKind::Command,
            commands: vec![argv.clone()],
        };
        save_session(app, &format!("Cmd - {}", input.replace('/', "|")), &record);
        finish(app, vec![Box::new(CommandInput::new(argv))]);
    }
}

fn save_session(app: &Logria, name: &str, record: &SessionRecord) {
    if let Err(e) = app.session_store.save(name, record) {
        tracing::warn!(session = name, error = %e, "failed to save session");
    }
}

/// Install the chosen streams and leave setup mode.
pub fn finish(app: &mut Logria, mut streams: Vec<Box<dyn InputStream>>) {
    for stream in &mut streams {
        stream.set_poll_rate(app.poll_rate);
        stream.start();
    }
    app.streams = streams;
    app.store.clear();
    app.active = Channel::Err;
    app.any_output_seen = false;
    app.flow = None;
    app.flow_messages.clear();
    app.input_mode = InputMode::None;
    app.invalidate_render();
    app.restore_status();
}
