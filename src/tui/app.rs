//! The interactive engine and its main loop.
//!
//! [`Logria`] owns every piece of session state: the sources and their
//! channel buffers, the optional filter index, the optional parser with its
//! analytics engine, the history tape, and the scroll state. One iteration of
//! the main loop drains the sources, handles at most one keystroke, advances
//! the incremental pipeline, renders when the visible range changed, and
//! sleeps out the remainder of the poll budget.
//!
//! Everything except the terminal itself is driven through methods on
//! [`Logria`], so the engine can be exercised headless in tests.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Position},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Terminal,
};

use crate::analytics::AnalyticsEngine;
use crate::ansi;
use crate::commands::{self, config as config_flow, parser_select, setup};
use crate::config::{Config, FASTEST_POLL_RATE};
use crate::error::{LogriaError, Result};
use crate::filter::FilterIndex;
use crate::history::HistoryTape;
use crate::parser::{Parser, ParserStore};
use crate::session::SessionStore;
use crate::store::{Channel, MessageStore};
use crate::stream::InputStream;

use super::command_line::{CommandLine, InputMode};
use super::events::{self, Event};
use super::render::{determine_position, visible_indices, Follow, SeqRef, Window};

/// Which sequence the view controller is rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The active channel buffer.
    Raw,
    /// Buffer lines addressed by the filter index.
    Filtered,
    /// The projected field of every parsed line.
    Parsed,
    /// The analytics summary.
    Analytics,
}

/// An interactive multi-step prompt the engine is collecting input for.
#[derive(Debug)]
pub enum Flow {
    /// Choosing or defining streams at startup or after `:restart`.
    Setup,
    /// Choosing a saved parser.
    ParserChoose,
    /// Choosing which field of the chosen parser to project.
    ParserField(Parser),
    /// Creating a session or parser under `:config`.
    Config(config_flow::ConfigFlow),
}

/// Fingerprint of the last render; a repaint happens only when it changes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderFingerprint {
    window: (isize, usize),
    content: u64,
}

/// The engine.
pub struct Logria {
    pub(crate) config: Config,

    // Sources and buffers
    pub(crate) streams: Vec<Box<dyn InputStream>>,
    pub(crate) store: MessageStore,
    pub(crate) active: Channel,
    pub(crate) any_output_seen: bool,

    // Filtering
    pub(crate) filter: Option<FilterIndex>,
    pub(crate) highlight_match: bool,

    // Parsing and analytics
    pub(crate) parser: Option<Parser>,
    pub(crate) parser_index: usize,
    pub(crate) parsed_messages: Vec<String>,
    pub(crate) last_index_processed: usize,
    pub(crate) analytics: Option<AnalyticsEngine>,
    pub(crate) analytics_lines: Vec<String>,

    // View state
    pub(crate) follow: Follow,
    pub(crate) current_end: usize,
    pub(crate) width: u16,
    pub(crate) height: u16,
    previous_render: Option<RenderFingerprint>,
    pub(crate) current_status: String,

    // Command line
    pub(crate) command_line: CommandLine,
    pub(crate) input_mode: InputMode,
    pub(crate) insert_mode: bool,
    pub(crate) history: HistoryTape,
    pub(crate) history_view: Option<Vec<String>>,

    // Interactive flows
    pub(crate) flow: Option<Flow>,
    pub(crate) flow_messages: Vec<String>,

    // Loop control
    pub(crate) poll_rate: Duration,
    pub(crate) smart_poll: bool,
    last_loop_time: Duration,
    pub(crate) exit_requested: bool,

    // Saved-state stores
    pub(crate) session_store: SessionStore,
    pub(crate) parser_store: ParserStore,
}

impl Logria {
    /// Build the engine. When `streams` is empty the engine starts in setup
    /// mode, letting the operator choose a saved session or type a new one;
    /// otherwise the given sources start producing immediately.
    pub fn new(config: Config, mut streams: Vec<Box<dyn InputStream>>) -> Result<Self> {
        config.ensure_dirs()?;
        let history = HistoryTape::new(&config)?;
        let session_store = SessionStore::new(&config);
        let parser_store = ParserStore::new(&config);
        let smart_poll = config.smart_poll;

        for stream in &mut streams {
            stream.start();
        }

        let mut app = Self {
            config,
            streams,
            store: MessageStore::new(),
            active: Channel::Err,
            any_output_seen: false,
            filter: None,
            highlight_match: false,
            parser: None,
            parser_index: 0,
            parsed_messages: Vec::new(),
            last_index_processed: 0,
            analytics: None,
            analytics_lines: Vec::new(),
            follow: Follow::Tail,
            current_end: 0,
            width: 80,
            height: 24,
            previous_render: None,
            current_status: "No filter applied".to_string(),
            command_line: CommandLine::new(),
            input_mode: InputMode::None,
            insert_mode: false,
            history,
            history_view: None,
            flow: None,
            flow_messages: Vec::new(),
            poll_rate: FASTEST_POLL_RATE,
            smart_poll,
            last_loop_time: FASTEST_POLL_RATE,
            exit_requested: false,
            session_store,
            parser_store,
        };

        if app.streams.is_empty() {
            setup::enter(&mut app);
        }

        Ok(app)
    }

    /// Run the interactive session until the operator quits.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().map_err(|e| {
            LogriaError::terminal("Cannot enter raw mode; an interactive terminal is required", e)
        })?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| LogriaError::terminal("Failed to enter alternate screen", e))?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)
            .map_err(|e| LogriaError::terminal("Failed to create terminal", e))?;
        let size = terminal
            .size()
            .map_err(|e| LogriaError::terminal("Failed to read terminal size", e))?;
        self.resize(size.width, size.height);

        let result = self.main_loop(&mut terminal);

        disable_raw_mode().map_err(|e| LogriaError::terminal("Failed to disable raw mode", e))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| LogriaError::terminal("Failed to leave alternate screen", e))?;
        terminal
            .show_cursor()
            .map_err(|e| LogriaError::terminal("Failed to show cursor", e))?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while !self.exit_requested {
            let loop_start = Instant::now();

            let new_messages = self.drain_streams();
            self.adjust_poll_rate(new_messages);
            self.select_initial_channel();

            match events::poll_event()? {
                Some(Event::Key(key)) => self.handle_key(key),
                Some(Event::Resize(w, h)) => self.resize(w, h),
                None => {
                    self.advance_pipeline();
                    self.render(terminal)?;
                }
            }

            let elapsed = loop_start.elapsed();
            if elapsed < self.poll_rate {
                std::thread::sleep(self.poll_rate - elapsed);
            }
            self.last_loop_time = loop_start.elapsed();
        }

        for stream in &mut self.streams {
            stream.terminate();
        }
        tracing::info!("session ended");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ingest

    /// Drain every source's queues into the channel buffers.
    pub fn drain_streams(&mut self) -> usize {
        let mut new_messages = 0;
        for stream in &mut self.streams {
            new_messages += stream.drain(Channel::Out, self.store.buffer_mut(Channel::Out));
            new_messages += stream.drain(Channel::Err, self.store.buffer_mut(Channel::Err));
        }
        new_messages
    }

    /// On the first output ever seen, watch the channel with more of it.
    pub fn select_initial_channel(&mut self) {
        if self.any_output_seen {
            return;
        }
        let out_len = self.store.len(Channel::Out);
        let err_len = self.store.len(Channel::Err);
        if out_len + err_len == 0 {
            return;
        }
        self.active = if out_len >= err_len {
            Channel::Out
        } else {
            Channel::Err
        };
        self.any_output_seen = true;
        self.previous_render = None;
        tracing::debug!(channel = %self.active, "selected initial channel");
    }

    /// Adapt the poll rate so one iteration covers roughly one message.
    fn adjust_poll_rate(&mut self, new_messages: usize) {
        if !self.smart_poll {
            return;
        }
        let target = if new_messages == 0 {
            // Nothing arrived; back off gradually
            self.poll_rate.saturating_mul(2)
        } else {
            let loop_secs = self.last_loop_time.as_secs_f64().max(1e-6);
            Duration::from_secs_f64(loop_secs / new_messages as f64)
        };
        let clamped = Config::clamp_poll_rate(target);
        if clamped != self.poll_rate {
            self.set_poll_rate(clamped);
        }
    }

    /// Set the poll rate, clamped, and propagate it to every source.
    pub fn set_poll_rate(&mut self, rate: Duration) {
        self.poll_rate = Config::clamp_poll_rate(rate);
        for stream in &self.streams {
            stream.set_poll_rate(self.poll_rate);
        }
    }

    // ------------------------------------------------------------------
    // Incremental pipeline

    /// Advance the filter index and the parser/analytics stage over lines
    /// that arrived since the last pass.
    pub fn advance_pipeline(&mut self) {
        if let Some(filter) = self.filter.as_mut() {
            filter.extend_from(self.store.buffer(self.active));
        }

        if let Some(parser) = &self.parser {
            let buffer = self.store.buffer(self.active);
            if let Some(engine) = self.analytics.as_mut() {
                for line in &buffer[self.last_index_processed..] {
                    let fields = parser.parse(line);
                    if !fields.is_empty() {
                        engine.ingest(&fields);
                    }
                }
                self.last_index_processed = buffer.len();
                self.analytics_lines = engine.render();
            } else {
                for line in &buffer[self.last_index_processed..] {
                    let fields = parser.parse(line);
                    if let Some(field) = fields.get(self.parser_index) {
                        self.parsed_messages.push(field.clone());
                    }
                }
                self.last_index_processed = buffer.len();
            }
        }
    }

    // ------------------------------------------------------------------
    // View state

    /// The mode the view controller is in, derived from the pipeline state.
    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.analytics.is_some() {
            Mode::Analytics
        } else if self.filter.is_some() {
            Mode::Filtered
        } else if self.parser.is_some() {
            Mode::Parsed
        } else {
            Mode::Raw
        }
    }

    /// The channel the view follows.
    #[must_use]
    pub fn active_channel(&self) -> Channel {
        self.active
    }

    /// The sequence the view controller renders right now.
    #[must_use]
    pub fn display(&self) -> SeqRef<'_> {
        if self.flow.is_some() {
            return SeqRef::Slice(&self.flow_messages);
        }
        if let Some(snapshot) = &self.history_view {
            return SeqRef::Slice(snapshot);
        }
        // The summary takes over the whole view; a lingering filter resumes
        // when analytics is toggled off
        if self.analytics.is_some() {
            return SeqRef::Slice(&self.analytics_lines);
        }
        if let Some(filter) = &self.filter {
            return SeqRef::Indexed {
                buffer: self.store.buffer(self.active),
                indices: filter.indices(),
            };
        }
        if self.parser.is_some() {
            return SeqRef::Slice(&self.parsed_messages);
        }
        SeqRef::Slice(self.store.buffer(self.active))
    }

    /// Rows available for output (the command line block takes three).
    #[must_use]
    pub fn output_rows(&self) -> usize {
        usize::from(self.height.saturating_sub(3)).max(1)
    }

    /// Compute the visible window for the current state, updating the scroll
    /// position the way a render would.
    pub fn visible_window(&mut self) -> Window {
        let last_row = self.output_rows();
        let width = usize::from(self.width.max(1));
        let window = {
            let seq = self.display();
            determine_position(&seq, self.follow, self.current_end, last_row, width)
        };
        self.current_end = window.current_end;
        window
    }

    /// Mark the last render stale so the next pass repaints.
    pub fn invalidate_render(&mut self) {
        self.previous_render = None;
    }

    /// Apply a terminal resize.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.previous_render = None;
    }

    /// The follow mode the viewport is in.
    #[must_use]
    pub fn follow_mode(&self) -> Follow {
        self.follow
    }

    /// The current scroll end position.
    #[must_use]
    pub fn scroll_end(&self) -> usize {
        self.current_end
    }

    /// The status line shown when the command line is idle.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.current_status
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    // ------------------------------------------------------------------
    // Keystrokes

    /// Dispatch one keystroke.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Raw mode swallows SIGINT; Ctrl+C arrives here instead
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.exit_requested = true;
            return;
        }
        if self.input_mode.is_editing() {
            self.handle_editing_key(key);
        } else {
            self.handle_view_key(key);
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => self.cancel_input(),
            KeyCode::Backspace => self.command_line.erase(),
            KeyCode::Delete => self.command_line.delete(),
            KeyCode::Left => self.command_line.left(),
            KeyCode::Right => self.command_line.right(),
            KeyCode::Home => self.command_line.home(),
            KeyCode::End => self.command_line.end(),
            KeyCode::Up => {
                let recalled = self.history.scroll_back();
                self.command_line.set_text(&recalled);
            }
            KeyCode::Down => {
                let recalled = self.history.scroll_forward();
                self.command_line.set_text(&recalled);
            }
            KeyCode::Char(c) => self.command_line.type_char(c, self.insert_mode),
            _ => {}
        }
    }

    fn handle_view_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(':') => {
                self.set_poll_rate(FASTEST_POLL_RATE);
                self.input_mode = InputMode::Command;
                // The colon is part of the command, as typed
                self.command_line.set_text(":");
            }
            KeyCode::Char('/') => {
                // Regex entry is inapplicable to the analytics summary
                if self.analytics.is_none() {
                    self.set_poll_rate(FASTEST_POLL_RATE);
                    self.input_mode = InputMode::Regex;
                }
            }
            KeyCode::Char('h') => self.toggle_highlight(),
            KeyCode::Char('i') => self.insert_mode = !self.insert_mode,
            KeyCode::Char('s') => self.swap_channel(),
            KeyCode::Char('p') => parser_select::enter(self),
            KeyCode::Char('a') => self.toggle_analytics(),
            KeyCode::Char('z') => self.teardown_parser(),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(self.output_rows()),
            KeyCode::PageDown => self.scroll_down(self.output_rows()),
            KeyCode::Right => self.follow_tail(),
            KeyCode::Left => self.follow_top(),
            _ => {}
        }
    }

    fn cancel_input(&mut self) {
        self.command_line.clear();
        if self.flow.is_none() {
            self.input_mode = InputMode::None;
        }
    }

    /// Submit whatever the command line holds.
    pub fn submit_input(&mut self) {
        let text = self.command_line.take().trim().to_string();
        let mode = self.input_mode;

        if let Some(flow) = self.flow.take() {
            // Flow handlers re-install the flow (or its successor) themselves
            match flow {
                Flow::Setup => setup::handle(self, &text),
                Flow::ParserChoose => parser_select::handle_choose(self, &text),
                Flow::ParserField(parser) => parser_select::handle_field(self, parser, &text),
                Flow::Config(state) => config_flow::handle(self, state, &text),
            }
            return;
        }

        self.input_mode = InputMode::None;
        match mode {
            InputMode::Regex => {
                if text.is_empty() || text == ":q" {
                    self.reset_filter();
                } else {
                    self.history.add(&text);
                    if let Err(e) = self.activate_filter(&text) {
                        // Prior state retained, nothing reported
                        tracing::debug!(error = %e, "rejected filter pattern");
                    }
                }
            }
            InputMode::Command => {
                if text.is_empty() {
                    self.restore_status();
                } else {
                    self.history.add(&text);
                    commands::handle_command(self, &text);
                }
            }
            InputMode::Prompt | InputMode::None => {}
        }
    }

    // ------------------------------------------------------------------
    // Filter

    /// Compile and activate a filter over the active channel buffer.
    ///
    /// On a compile error the engine is left exactly as it was.
    pub fn activate_filter(&mut self, pattern: &str) -> Result<()> {
        let mut filter = FilterIndex::compile(pattern)?;
        filter.extend_from(self.store.buffer(self.active));
        tracing::debug!(pattern, matches = filter.len(), "activated filter");
        self.filter = Some(filter);
        self.highlight_match = true;
        self.follow = Follow::Tail;
        self.current_end = 0;
        self.previous_render = None;
        self.current_status = format!("Regex with pattern /{pattern}/");
        Ok(())
    }

    /// Drop the filter and return to the unfiltered view.
    pub fn reset_filter(&mut self) {
        self.filter = None;
        self.highlight_match = false;
        self.follow = Follow::Tail;
        self.current_end = 0;
        self.previous_render = None;
        self.restore_status();
    }

    /// Toggle match highlighting. Meaningful only while a filter is active.
    pub fn toggle_highlight(&mut self) {
        self.previous_render = None;
        self.highlight_match = self.filter.is_some() && !self.highlight_match;
    }

    // ------------------------------------------------------------------
    // Parser and analytics

    /// Install a parser projecting field `index`, resetting the pipeline.
    pub fn set_parser(&mut self, parser: Parser, index: usize) {
        tracing::debug!(parser = parser.name(), field = index, "activated parser");
        self.parser = Some(parser);
        self.parser_index = index;
        self.parsed_messages.clear();
        self.analytics = None;
        self.analytics_lines.clear();
        self.last_index_processed = 0;
        self.follow = Follow::Tail;
        self.current_end = 0;
        self.previous_render = None;
        self.restore_status();
    }

    /// Remove the parser and its derived state.
    pub fn teardown_parser(&mut self) {
        self.parser = None;
        self.parser_index = 0;
        self.parsed_messages.clear();
        self.analytics = None;
        self.analytics_lines.clear();
        self.last_index_processed = 0;
        self.follow = Follow::Tail;
        self.current_end = 0;
        self.previous_render = None;
        self.restore_status();
    }

    /// Toggle between the parsed view and the analytics summary. The
    /// incremental cursor rewinds so the other stage rebuilds from the start
    /// of the buffer.
    pub fn toggle_analytics(&mut self) {
        let Some(parser) = &self.parser else {
            return;
        };
        self.last_index_processed = 0;
        if self.analytics.is_some() {
            self.analytics = None;
            self.analytics_lines.clear();
            self.parsed_messages.clear();
        } else {
            self.analytics = Some(AnalyticsEngine::new(parser, self.config.analytics_top_k));
            self.analytics_lines.clear();
        }
        self.previous_render = None;
        self.restore_status();
    }

    // ------------------------------------------------------------------
    // Channel and scrolling

    /// Swap between stdout and stderr, tearing down the whole pipeline.
    pub fn swap_channel(&mut self) {
        self.teardown_parser();
        self.reset_filter();
        self.active = self.active.other();
        self.previous_render = None;
        tracing::debug!(channel = %self.active, "swapped channel");
    }

    fn scroll_up(&mut self, step: usize) {
        self.set_poll_rate(FASTEST_POLL_RATE);
        self.follow = Follow::Manual;
        self.current_end = self.current_end.saturating_sub(step);
        self.previous_render = None;
    }

    fn scroll_down(&mut self, step: usize) {
        self.set_poll_rate(FASTEST_POLL_RATE);
        self.follow = Follow::Manual;
        let len = self.display().len();
        self.current_end = (self.current_end + step).min(len.saturating_sub(1));
        self.previous_render = None;
    }

    fn follow_tail(&mut self) {
        self.follow = Follow::Tail;
        self.previous_render = None;
    }

    fn follow_top(&mut self) {
        self.follow = Follow::Top;
        self.previous_render = None;
    }

    // ------------------------------------------------------------------
    // History view

    /// Replace the view with a read-only snapshot of the last `n` commands.
    pub fn start_history_mode(&mut self, n: usize) {
        self.history_view = Some(self.history.tail(n));
        self.follow = Follow::Tail;
        self.current_end = 0;
        self.previous_render = None;
    }

    /// Leave the history snapshot, restoring the prior view.
    pub fn end_history_mode(&mut self) {
        if self.history_view.take().is_some() {
            self.previous_render = None;
        }
    }

    // ------------------------------------------------------------------
    // Restart

    /// Kill every source, clear all state, and re-enter setup.
    pub fn restart(&mut self) {
        tracing::info!("restarting engine");
        for stream in &mut self.streams {
            stream.terminate();
        }
        self.streams.clear();
        self.store.clear();
        self.filter = None;
        self.highlight_match = false;
        self.parser = None;
        self.parser_index = 0;
        self.parsed_messages.clear();
        self.analytics = None;
        self.analytics_lines.clear();
        self.last_index_processed = 0;
        self.history_view = None;
        self.any_output_seen = false;
        self.active = Channel::Err;
        self.follow = Follow::Tail;
        self.current_end = 0;
        self.previous_render = None;
        setup::enter(self);
    }

    // ------------------------------------------------------------------
    // Status line

    /// The label shown for the projected field: its analytics label when the
    /// mapping has one, else the bare index.
    #[must_use]
    pub fn field_name(&self) -> String {
        self.parser
            .as_ref()
            .and_then(|p| p.label_for_index(self.parser_index))
            .map_or_else(|| self.parser_index.to_string(), str::to_string)
    }

    /// Recompute the status line from the pipeline state.
    pub fn restore_status(&mut self) {
        self.current_status = match (&self.parser, &self.filter) {
            (Some(parser), _) if self.analytics.is_some() => {
                format!("Parsing with {}, analytics view", parser.name())
            }
            (_, Some(filter)) => format!("Regex with pattern /{}/", filter.pattern()),
            (Some(parser), None) => {
                format!("Parsing with {}, field {}", parser.name(), self.field_name())
            }
            (None, None) => "No filter applied".to_string(),
        };
    }

    // ------------------------------------------------------------------
    // Render

    /// Render the current state, skipping the repaint when nothing visible
    /// changed. Analytics re-derives its sequence every pass, so it always
    /// paints.
    fn render(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        let last_row = self.output_rows();
        let width = usize::from(self.width.max(1));

        let (window, lines, content_hash) = {
            let seq = self.display();
            let window = determine_position(&seq, self.follow, self.current_end, last_row, width);
            let visible = visible_indices(&seq, window, last_row, width);
            let lines = self.build_lines(&seq, &visible);

            let mut hasher = DefaultHasher::new();
            for index in &visible {
                seq.line(*index).hash(&mut hasher);
            }
            self.current_status.hash(&mut hasher);
            self.command_line.text().hash(&mut hasher);
            self.command_line.cursor().hash(&mut hasher);
            self.highlight_match.hash(&mut hasher);
            (window, lines, hasher.finish())
        };
        self.current_end = window.current_end;

        let fingerprint = RenderFingerprint {
            window: (window.start, window.end),
            content: content_hash,
        };
        if self.analytics.is_none() && self.previous_render.as_ref() == Some(&fingerprint) {
            return Ok(());
        }

        let editing = self.input_mode.is_editing();
        let prompt = if editing {
            format!("{}{}", self.input_mode.prefix(), self.command_line.text())
        } else {
            self.current_status.clone()
        };
        let cursor_col = self.input_mode.prefix().len() + self.command_line.cursor();

        terminal
            .draw(|f| {
                let chunks =
                    Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).split(f.area());

                f.render_widget(Paragraph::new(lines.clone()), chunks[0]);

                let command_block = Block::bordered();
                f.render_widget(Paragraph::new(prompt.clone()).block(command_block), chunks[1]);

                if editing {
                    f.set_cursor_position(Position::new(
                        chunks[1].x + 1 + cursor_col as u16,
                        chunks[1].y + 1,
                    ));
                }
            })
            .map_err(|e| LogriaError::terminal("Failed to draw frame", e))?;

        self.previous_render = Some(fingerprint);
        Ok(())
    }

    /// Build the styled lines for the visible indices.
    fn build_lines(&self, seq: &SeqRef<'_>, visible: &[usize]) -> Vec<Line<'static>> {
        visible
            .iter()
            .map(|&index| {
                let raw = seq.line(index);
                if self.highlight_match && self.mode() == Mode::Filtered {
                    if let Some(filter) = &self.filter {
                        return highlight_line(raw, filter);
                    }
                }
                Line::from(ansi::parse_spans(raw))
            })
            .collect()
    }
}

/// Strip a filtered line's color codes and wrap its leftmost match in the
/// highlight style.
fn highlight_line(raw: &str, filter: &FilterIndex) -> Line<'static> {
    let stripped = ansi::strip_codes(raw);
    match filter.match_span(&stripped) {
        Some((start, end)) => {
            let highlight = Style::default().fg(Color::Magenta);
            Line::from(vec![
                Span::raw(stripped[..start].to_string()),
                Span::styled(stripped[start..end].to_string(), highlight),
                Span::raw(stripped[end..].to_string()),
            ])
        }
        None => Line::from(stripped),
    }
}
