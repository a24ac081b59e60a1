//! Configuration flow.
//!
//! `:config` walks the operator through creating a saved session or a saved
//! parser with a short sequence of prompts. Parsers get a default analytics
//! mapping assigning `count` to every field of the example; the saved JSON is
//! human-editable for anything fancier.

use indexmap::IndexMap;

use crate::analytics::AnalyticsMethod;
use crate::config::{
    CONFIG_START_MESSAGES, CREATE_PARSER_START, CREATE_SESSION_START, PARSER_SET_EXAMPLE,
    PARSER_SET_NAME, PARSER_SET_PATTERN, SAVE_CURRENT_PARSER, SAVE_CURRENT_SESSION,
    SESSION_ADD_COMMAND, SESSION_ADD_FILE, SESSION_SHOULD_CONTINUE_COMMAND,
    SESSION_SHOULD_CONTINUE_FILE,
};
use crate::parser::{Parser, ParserRecord, PatternType};
use crate::session::{SessionKind, SessionRecord};
use crate::tui::app::{Flow, Logria};
use crate::tui::command_line::InputMode;
use crate::util::resolver::{join_segments, Resolver};

use super::setup;

/// Where in the configuration dialog the operator is.
#[derive(Debug)]
pub enum ConfigFlow {
    /// Choosing between `session` and `parser`.
    Choose,
    /// Choosing the session kind, `command` or `file`.
    SessionType,
    /// Collecting the next command or file path.
    SessionEntry {
        /// Kind chosen earlier in the dialog.
        kind: SessionKind,
        /// Entries collected so far.
        commands: Vec<Vec<String>>,
    },
    /// Asking whether to save or add another entry.
    SessionContinue {
        /// Kind chosen earlier in the dialog.
        kind: SessionKind,
        /// Entries collected so far.
        commands: Vec<Vec<String>>,
    },
    /// Collecting the session name.
    SessionName {
        /// Kind chosen earlier in the dialog.
        kind: SessionKind,
        /// Entries collected so far.
        commands: Vec<Vec<String>>,
    },
    /// Choosing the parser kind, `regex` or `split`.
    ParserType,
    /// Collecting the parser name.
    ParserName {
        /// Kind chosen earlier in the dialog.
        kind: PatternType,
    },
    /// Collecting the example line.
    ParserExample {
        /// Kind chosen earlier in the dialog.
        kind: PatternType,
        /// Name collected earlier in the dialog.
        name: String,
    },
    /// Collecting the pattern.
    ParserPattern {
        /// Kind chosen earlier in the dialog.
        kind: PatternType,
        /// Name collected earlier in the dialog.
        name: String,
        /// Example collected earlier in the dialog.
        example: String,
    },
    /// Confirming the save of a validated record.
    ParserSave {
        /// The record about to be saved.
        record: ParserRecord,
    },
}

/// Enter configuration mode.
pub fn enter(app: &mut Logria) {
    app.flow = Some(Flow::Config(ConfigFlow::Choose));
    app.flow_messages = CONFIG_START_MESSAGES.iter().map(|s| (*s).to_string()).collect();
    app.input_mode = InputMode::Prompt;
    app.current_end = 0;
    app.invalidate_render();
}

fn show(app: &mut Logria, state: ConfigFlow, messages: Vec<String>) {
    app.flow_messages = messages;
    app.flow = Some(Flow::Config(state));
    app.invalidate_render();
}

fn push_message(app: &mut Logria, state: ConfigFlow, message: String) {
    app.flow_messages.push(message);
    app.flow = Some(Flow::Config(state));
    app.invalidate_render();
}

fn session_listing(commands: &[Vec<String>], next_prompt: &str) -> Vec<String> {
    let mut messages: Vec<String> = commands.iter().map(|entry| entry.join(" ")).collect();
    messages.push(next_prompt.to_string());
    messages
}

/// Handle one submitted line of configuration input.
pub fn handle(app: &mut Logria, state: ConfigFlow, input: &str) {
    if input == ":q" {
        // Backing all the way out abandons the dialog
        match state {
            ConfigFlow::ParserSave { .. } => setup::enter(app),
            _ => app.exit_requested = true,
        }
        return;
    }

    match state {
        ConfigFlow::Choose => match input {
            "session" => show(
                app,
                ConfigFlow::SessionType,
                vec![CREATE_SESSION_START.to_string()],
            ),
            "parser" => show(
                app,
                ConfigFlow::ParserType,
                vec![CREATE_PARSER_START.to_string()],
            ),
            _ => app.flow = Some(Flow::Config(ConfigFlow::Choose)),
        },

        ConfigFlow::SessionType => match input {
            "command" => show(
                app,
                ConfigFlow::SessionEntry {
                    kind: SessionKind::Command,
                    commands: Vec::new(),
                },
                vec![SESSION_ADD_COMMAND.to_string()],
            ),
            "file" => show(
                app,
                ConfigFlow::SessionEntry {
                    kind: SessionKind::File,
                    commands: Vec::new(),
                },
                vec![SESSION_ADD_FILE.to_string()],
            ),
            _ => app.flow = Some(Flow::Config(ConfigFlow::SessionType)),
        },

        ConfigFlow::SessionEntry { kind, mut commands } => {
            if input.is_empty() {
                app.flow = Some(Flow::Config(ConfigFlow::SessionEntry { kind, commands }));
                return;
            }
            let resolver = Resolver::new();
            match kind {
                SessionKind::File => {
                    let segments = resolver.resolve_file(input);
                    if join_segments(&segments).is_file() {
                        commands.push(segments);
                        let messages =
                            session_listing(&commands, SESSION_SHOULD_CONTINUE_FILE);
                        show(app, ConfigFlow::SessionContinue { kind, commands }, messages);
                    } else {
                        push_message(
                            app,
                            ConfigFlow::SessionEntry { kind, commands },
                            format!("Cannot resolve path: {input}"),
                        );
                    }
                }
                SessionKind::Command => {
                    commands.push(resolver.resolve_command(input));
                    let messages = session_listing(&commands, SESSION_SHOULD_CONTINUE_COMMAND);
                    show(app, ConfigFlow::SessionContinue { kind, commands }, messages);
                }
            }
        }

        ConfigFlow::SessionContinue { kind, commands } => {
            if input == ":s" {
                show(
                    app,
                    ConfigFlow::SessionName { kind, commands },
                    vec![SAVE_CURRENT_SESSION.to_string()],
                );
            } else {
                let prompt = match kind {
                    SessionKind::Command => SESSION_ADD_COMMAND,
                    SessionKind::File => SESSION_ADD_FILE,
                };
                show(
                    app,
                    ConfigFlow::SessionEntry { kind, commands },
                    vec![prompt.to_string()],
                );
            }
        }

        ConfigFlow::SessionName { kind, commands } => {
            if input.is_empty() {
                app.flow = Some(Flow::Config(ConfigFlow::SessionName { kind, commands }));
                return;
            }
            let record = SessionRecord { kind, commands };
            if let Err(e) = app.session_store.save(input, &record) {
                tracing::warn!(session = input, error = %e, "failed to save session");
            }
            setup::enter(app);
        }

        ConfigFlow::ParserType => match input {
            "regex" => show(
                app,
                ConfigFlow::ParserName {
                    kind: PatternType::Regex,
                },
                vec![PARSER_SET_NAME.to_string()],
            ),
            "split" => show(
                app,
                ConfigFlow::ParserName {
                    kind: PatternType::Split,
                },
                vec![PARSER_SET_NAME.to_string()],
            ),
            _ => app.flow = Some(Flow::Config(ConfigFlow::ParserType)),
        },

        ConfigFlow::ParserName { kind } => {
            if input.is_empty() {
                app.flow = Some(Flow::Config(ConfigFlow::ParserName { kind }));
                return;
            }
            show(
                app,
                ConfigFlow::ParserExample {
                    kind,
                    name: input.to_string(),
                },
                vec![
                    format!("Parser name {input}"),
                    PARSER_SET_EXAMPLE.to_string(),
                ],
            );
        }

        ConfigFlow::ParserExample { kind, name } => {
            if input.is_empty() {
                app.flow = Some(Flow::Config(ConfigFlow::ParserExample { kind, name }));
                return;
            }
            show(
                app,
                ConfigFlow::ParserPattern {
                    kind,
                    name,
                    example: input.to_string(),
                },
                vec![
                    format!("Parser example {input}"),
                    PARSER_SET_PATTERN.to_string(),
                ],
            );
        }

        ConfigFlow::ParserPattern {
            kind,
            name,
            example,
        } => {
            if input.is_empty() {
                app.flow = Some(Flow::Config(ConfigFlow::ParserPattern {
                    kind,
                    name,
                    example,
                }));
                return;
            }
            // Every field of the example defaults to a count accumulator,
            // keyed by the field's example value
            let probe = ParserRecord {
                pattern: input.to_string(),
                kind,
                name: name.clone(),
                example: example.clone(),
                analytics: IndexMap::new(),
            };
            match Parser::from_record(probe) {
                Ok(parser) => {
                    let analytics: IndexMap<String, AnalyticsMethod> = parser
                        .parse(&example)
                        .into_iter()
                        .map(|field| (field, AnalyticsMethod::Count))
                        .collect();
                    let record = ParserRecord {
                        pattern: input.to_string(),
                        kind,
                        name,
                        example,
                        analytics,
                    };
                    let mut messages = describe_record(&record);
                    messages.push(SAVE_CURRENT_PARSER.to_string());
                    show(app, ConfigFlow::ParserSave { record }, messages);
                }
                Err(e) => {
                    push_message(
                        app,
                        ConfigFlow::ParserPattern {
                            kind,
                            name,
                            example,
                        },
                        e.to_string(),
                    );
                }
            }
        }

        ConfigFlow::ParserSave { record } => {
            if let Err(e) = app.parser_store.save(&record) {
                tracing::warn!(parser = %record.name, error = %e, "failed to save parser");
            }
            setup::enter(app);
        }
    }
}

fn describe_record(record: &ParserRecord) -> Vec<String> {
    let mut messages = vec![
        format!("Name: {}", record.name),
        format!("Pattern: {}", record.pattern),
        format!("Example: {}", record.example),
    ];
    for (label, method) in &record.analytics {
        messages.push(format!("{label}: {method:?}"));
    }
    messages
}
