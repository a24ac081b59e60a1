//! ANSI color escape handling.
//!
//! Buffered lines may carry embedded 3/4-bit color escape sequences. This
//! module owns everything the engine needs to know about them: stripping them
//! for regex matching and length accounting, and translating them into styled
//! spans for the renderer. Unknown codes fall back to the default style.
//!
//! The width model is one display column per character outside escape
//! sequences; combining marks and east-asian width are not supported.

use once_cell::sync::Lazy;
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use regex::Regex;

/// Matches an ANSI escape sequence: `ESC [ params FINAL` or the single-byte
/// CSI, any parameter and intermediate bytes, and a final byte.
static ANSI_COLOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\x9B|\x1B\[)[0-?]*[ -/]*[@-~]").unwrap());

/// Remove every color escape sequence from a line.
#[must_use]
pub fn strip_codes(line: &str) -> String {
    ANSI_COLOR_PATTERN.replace_all(line, "").into_owned()
}

/// The printable length of a line, excluding escape sequences.
#[must_use]
pub fn real_length(line: &str) -> usize {
    strip_codes(line).chars().count()
}

/// Map a 3/4-bit SGR parameter to a terminal color.
///
/// Recognizes foreground `30..=37` and `90..=97`, background `40..=47` and
/// `100..=107`, and reset `0`. Anything else resets to the default style.
fn apply_sgr(style: Style, param: u16) -> Style {
    let fg = |style: Style, color| style.fg(color);
    let bg = |style: Style, color| style.bg(color);
    match param {
        0 => Style::default(),
        30 => fg(style, Color::Black),
        31 => fg(style, Color::Red),
        32 => fg(style, Color::Green),
        33 => fg(style, Color::Yellow),
        34 => fg(style, Color::Blue),
        35 => fg(style, Color::Magenta),
        36 => fg(style, Color::Cyan),
        37 => fg(style, Color::White),
        90 => fg(style, Color::DarkGray),
        91 => fg(style, Color::LightRed),
        92 => fg(style, Color::LightGreen),
        93 => fg(style, Color::LightYellow),
        94 => fg(style, Color::LightBlue),
        95 => fg(style, Color::LightMagenta),
        96 => fg(style, Color::LightCyan),
        97 => fg(style, Color::Gray),
        40 => bg(style, Color::Black),
        41 => bg(style, Color::Red),
        42 => bg(style, Color::Green),
        43 => bg(style, Color::Yellow),
        44 => bg(style, Color::Blue),
        45 => bg(style, Color::Magenta),
        46 => bg(style, Color::Cyan),
        47 => bg(style, Color::White),
        100 => bg(style, Color::DarkGray),
        101 => bg(style, Color::LightRed),
        102 => bg(style, Color::LightGreen),
        103 => bg(style, Color::LightYellow),
        104 => bg(style, Color::LightBlue),
        105 => bg(style, Color::LightMagenta),
        106 => bg(style, Color::LightCyan),
        107 => bg(style, Color::Gray),
        _ => Style::default(),
    }
}

/// Split a line into styled spans, consuming its color escape sequences.
///
/// Escape characters never reach the output; a line with no escapes becomes a
/// single default-styled span.
#[must_use]
pub fn parse_spans(line: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut style = Style::default();
    let mut cursor = 0;

    for m in ANSI_COLOR_PATTERN.find_iter(line) {
        if m.start() > cursor {
            spans.push(Span::styled(line[cursor..m.start()].to_string(), style));
        }
        style = style_from_sequence(m.as_str(), style);
        cursor = m.end();
    }
    if cursor < line.len() {
        spans.push(Span::styled(line[cursor..].to_string(), style));
    }
    if spans.is_empty() {
        spans.push(Span::raw(String::new()));
    }
    spans
}

/// Update a style from one matched escape sequence.
///
/// Only SGR sequences (final byte `m`) change the style; cursor movement and
/// other control sequences are dropped without effect.
fn style_from_sequence(sequence: &str, current: Style) -> Style {
    if !sequence.ends_with('m') {
        return current;
    }
    // Parameters sit between the introducer and the final byte
    let params = sequence
        .trim_start_matches('\u{9B}')
        .trim_start_matches("\u{1B}[")
        .trim_end_matches('m');
    if params.is_empty() {
        return Style::default();
    }
    let mut style = current;
    for part in params.split(';') {
        match part.parse::<u16>() {
            Ok(param) => style = apply_sgr(style, param),
            Err(_) => style = Style::default(),
        }
    }
    style
}
