//! Parser selection flow.
//!
//! Pressing `p` lists the saved parsers; the operator picks one by number,
//! then picks which field of the example to project. `q` backs out at either
//! step; `:r` at the listing deletes saved parsers.

use crate::parser::Parser;
use crate::tui::app::{Flow, Logria};
use crate::tui::command_line::InputMode;

use super::{names_for_indices, resolve_delete_command};

/// Enter the parser listing, tearing down any active parser and filter.
pub fn enter(app: &mut Logria) {
    app.teardown_parser();
    app.reset_filter();
    app.flow = Some(Flow::ParserChoose);
    render_listing(app);
    app.input_mode = InputMode::Prompt;
}

fn render_listing(app: &mut Logria) {
    app.flow_messages = app
        .parser_store
        .list()
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}: {name}", i + 1))
        .collect();
    if app.flow_messages.is_empty() {
        app.flow_messages
            .push("No saved parsers; create one with :config".to_string());
    }
    app.invalidate_render();
}

/// Handle a submission at the parser listing.
pub fn handle_choose(app: &mut Logria, input: &str) {
    if input == "q" || input == ":q" {
        cancel(app);
        return;
    }
    if input.starts_with(":r ") {
        let indices = resolve_delete_command(input);
        let names = app.parser_store.list();
        for name in names_for_indices(&names, &indices) {
            if let Err(e) = app.parser_store.remove(&name) {
                tracing::warn!(parser = %name, error = %e, "failed to remove parser");
            }
        }
        app.flow = Some(Flow::ParserChoose);
        render_listing(app);
        return;
    }

    let names = app.parser_store.list();
    let chosen = input
        .parse::<usize>()
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| names.get(i));
    let Some(name) = chosen else {
        app.flow = Some(Flow::ParserChoose);
        return;
    };

    match app.parser_store.load(name) {
        Ok(parser) => {
            app.flow_messages = parser.display_example();
            app.flow = Some(Flow::ParserField(parser));
            app.invalidate_render();
        }
        Err(e) => {
            app.flow = Some(Flow::ParserChoose);
            render_listing(app);
            app.flow_messages.push(e.to_string());
        }
    }
}

/// Handle a submission at the field listing.
pub fn handle_field(app: &mut Logria, parser: Parser, input: &str) {
    if input == "q" || input == ":q" {
        cancel(app);
        return;
    }
    match input.parse::<usize>() {
        Ok(index) if index < parser.field_count() => {
            app.flow = None;
            app.flow_messages.clear();
            app.input_mode = InputMode::None;
            app.set_parser(parser, index);
        }
        _ => {
            // Not a valid field; keep asking
            app.flow = Some(Flow::ParserField(parser));
        }
    }
}

fn cancel(app: &mut Logria) {
    app.flow = None;
    app.flow_messages.clear();
    app.input_mode = InputMode::None;
    app.teardown_parser();
    app.invalidate_render();
}
