//! Visible-window computation.
//!
//! Given the active sequence, the follow mode, and the viewport geometry, the
//! functions here decide which slice of the sequence is visible. Lines longer
//! than the viewport width wrap, so the window walks row budgets rather than
//! line counts. The math is independent of the terminal so it can be tested
//! directly.

use crate::ansi;

/// How the viewport tracks the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Follow {
    /// Stay at the bottom as new lines arrive.
    Tail,
    /// Stay at the top and ignore new lines.
    Top,
    /// Hold a fixed end position chosen by the operator.
    Manual,
}

/// A sequence of renderable lines.
///
/// Either a buffer directly, or a buffer viewed through the filter index.
#[derive(Debug, Clone, Copy)]
pub enum SeqRef<'a> {
    /// A plain list of lines.
    Slice(&'a [String]),
    /// Buffer lines addressed by the filter's matched indices.
    Indexed {
        /// The underlying channel buffer.
        buffer: &'a [String],
        /// Matched indices into `buffer`.
        indices: &'a [usize],
    },
}

impl SeqRef<'_> {
    /// Number of renderable lines.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Slice(lines) => lines.len(),
            Self::Indexed { indices, .. } => indices.len(),
        }
    }

    /// Whether there is nothing to render.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The line at `index` within the sequence.
    #[must_use]
    pub fn line(&self, index: usize) -> &str {
        match self {
            Self::Slice(lines) => &lines[index],
            Self::Indexed { buffer, indices } => &buffer[indices[index]],
        }
    }
}

/// The computed window over a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Exclusive lower bound of the visible range; `-1` means "from the
    /// first line".
    pub start: isize,
    /// Index of the last visible line.
    pub end: usize,
    /// Where the view now ends; fed back into the scroll state.
    pub current_end: usize,
}

/// Rows one line occupies at `width` columns. An empty line still takes a
/// row.
#[must_use]
pub fn line_rows(line: &str, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    ansi::real_length(line).div_ceil(width).max(1)
}

/// Determine the start and end positions for a screen render.
///
/// `last_row` is the number of rows available for output and `current_end`
/// the end position from the previous render (meaningful in manual mode,
/// clamped when the operator over-scrolled).
#[must_use]
pub fn determine_position(
    seq: &SeqRef<'_>,
    follow: Follow,
    current_end: usize,
    last_row: usize,
    width: usize,
) -> Window {
    match follow {
        Follow::Top => {
            let mut end = 0;
            let mut rows = 0;
            for i in 0..seq.len() {
                rows += line_rows(seq.line(i), width);
                // If the next line fits, include it
                if rows < last_row && end < seq.len().saturating_sub(1) {
                    end += 1;
                } else {
                    break;
                }
            }
            let start = if seq.is_empty() { 0 } else { -1 };
            Window {
                start,
                end,
                current_end: end,
            }
        }
        Follow::Tail => {
            let end = seq.len().saturating_sub(1);
            finish(end, last_row)
        }
        Follow::Manual => {
            let len = seq.len();
            let end = if len < last_row {
                // Fewer lines than rows: render everything
                len.saturating_sub(1)
            } else if current_end < len {
                current_end
            } else {
                // Over-scrolled: clamp back to the end
                len
            };
            finish(end, last_row)
        }
    }
}

fn finish(end: usize, last_row: usize) -> Window {
    let start = (end as isize - last_row as isize - 1).max(-1);
    Window {
        start,
        end,
        current_end: end,
    }
}

/// The sequence indices that fit in the window, in render (top-down) order.
///
/// Walks backwards from the window end, spending `last_row` rows; a line
/// whose wrapped height would overflow the remaining budget stops the walk.
#[must_use]
pub fn visible_indices(
    seq: &SeqRef<'_>,
    window: Window,
    last_row: usize,
    width: usize,
) -> Vec<usize> {
    if seq.is_empty() {
        return Vec::new();
    }
    let mut rows_left = last_row as isize;
    let mut visible = Vec::new();
    let end = window.end.min(seq.len() - 1);
    let mut i = end as isize;
    while i > window.start {
        let index = i as usize;
        rows_left -= line_rows(seq.line(index), width) as isize;
        if rows_left < 0 {
            break;
        }
        visible.push(index);
        i -= 1;
    }
    visible.reverse();
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_empty_sequence_renders_nothing() {
        let buffer: Vec<String> = Vec::new();
        let seq = SeqRef::Slice(&buffer);

        let window = determine_position(&seq, Follow::Tail, 0, 7, 80);
        assert_eq!(window.end, 0);
        assert!(visible_indices(&seq, window, 7, 80).is_empty());

        let window = determine_position(&seq, Follow::Top, 0, 7, 80);
        assert_eq!((window.start, window.end), (0, 0));
        assert!(visible_indices(&seq, window, 7, 80).is_empty());
    }

    #[test]
    fn test_tail_window_shows_last_lines() {
        let buffer = lines(100);
        let seq = SeqRef::Slice(&buffer);

        let window = determine_position(&seq, Follow::Tail, 0, 7, 80);
        assert_eq!(window.end, 99);
        assert_eq!(visible_indices(&seq, window, 7, 80), (93..=99).collect::<Vec<_>>());
    }

    #[test]
    fn test_manual_scroll_up_then_back_to_tail() {
        let buffer = lines(100);
        let seq = SeqRef::Slice(&buffer);

        // Tail render leaves current_end at 99; one step up shows 92..=98
        let window = determine_position(&seq, Follow::Manual, 98, 7, 80);
        assert_eq!(window.end, 98);
        assert_eq!(visible_indices(&seq, window, 7, 80), (92..=98).collect::<Vec<_>>());

        // Back to tail
        let window = determine_position(&seq, Follow::Tail, window.current_end, 7, 80);
        assert_eq!(visible_indices(&seq, window, 7, 80), (93..=99).collect::<Vec<_>>());
    }

    #[test]
    fn test_manual_with_few_lines_shows_all() {
        let buffer = lines(3);
        let seq = SeqRef::Slice(&buffer);

        let window = determine_position(&seq, Follow::Manual, 1, 7, 80);
        assert_eq!(window.end, 2);
        assert_eq!(visible_indices(&seq, window, 7, 80), vec![0, 1, 2]);
    }

    #[test]
    fn test_manual_overscroll_clamps() {
        let buffer = lines(20);
        let seq = SeqRef::Slice(&buffer);

        let window = determine_position(&seq, Follow::Manual, 500, 7, 80);
        assert_eq!(window.current_end, 20);
    }

    #[test]
    fn test_top_window_fills_from_first_line() {
        let buffer = lines(100);
        let seq = SeqRef::Slice(&buffer);

        let window = determine_position(&seq, Follow::Top, 50, 7, 80);
        assert_eq!(window.start, -1);
        let visible = visible_indices(&seq, window, 7, 80);
        assert_eq!(visible[0], 0);
        assert!(visible.len() <= 7);
    }

    #[test]
    fn test_long_line_consumes_multiple_rows() {
        let mut buffer = lines(10);
        buffer.push("x".repeat(200)); // 3 rows at width 80

        let seq = SeqRef::Slice(&buffer);
        let window = determine_position(&seq, Follow::Tail, 0, 7, 80);
        let visible = visible_indices(&seq, window, 7, 80);

        // The long line costs 3 rows, leaving 4 for earlier lines
        assert_eq!(visible.len(), 5);
        assert_eq!(*visible.last().unwrap(), 10);
    }

    #[test]
    fn test_line_rows_accounting() {
        assert_eq!(line_rows("", 80), 1);
        assert_eq!(line_rows("short", 80), 1);
        assert_eq!(line_rows(&"x".repeat(80), 80), 1);
        assert_eq!(line_rows(&"x".repeat(81), 80), 2);
        // Escape sequences are free
        assert_eq!(line_rows(&format!("\u{1B}[31m{}\u{1B}[0m", "y".repeat(80)), 80), 1);
    }

    #[test]
    fn test_indexed_sequence_addresses_buffer() {
        let buffer: Vec<String> = ["err1", "info2", "err3"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let indices = vec![0, 2];
        let seq = SeqRef::Indexed {
            buffer: &buffer,
            indices: &indices,
        };

        assert_eq!(seq.len(), 2);
        assert_eq!(seq.line(0), "err1");
        assert_eq!(seq.line(1), "err3");

        let window = determine_position(&seq, Follow::Tail, 0, 7, 80);
        assert_eq!(visible_indices(&seq, window, 7, 80), vec![0, 1]);
    }
}
