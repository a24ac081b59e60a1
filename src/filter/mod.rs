//! Incremental regex filtering over a channel buffer.
//!
//! A [`FilterIndex`] is created when the operator activates `/pattern` and
//! torn down on `/:q` or a reset. It holds a monotonically growing list of
//! indices into the active buffer whose lines match the pattern, extended a
//! slice at a time between main-loop iterations so filtering never blocks
//! ingest. Color escape sequences are stripped before matching.

use regex::Regex;

use crate::ansi;
use crate::error::{LogriaError, Result};

/// A compiled filter and the buffer indices it has matched so far.
#[derive(Debug)]
pub struct FilterIndex {
    pattern: String,
    regex: Regex,
    matched_rows: Vec<usize>,
    last_index_regexed: usize,
}

impl FilterIndex {
    /// Compile a pattern into a fresh filter.
    ///
    /// A pattern that fails to compile is rejected here, before any engine
    /// state changes, so the previous filter (if any) stays in effect.
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| LogriaError::regex(pattern, e))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            matched_rows: Vec::new(),
            last_index_regexed: 0,
        })
    }

    /// The pattern as the operator typed it.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Scan the unseen tail of `buffer` and record the indices that match.
    ///
    /// Returns how many new rows matched. Indices are appended in order, so
    /// the list stays strictly increasing.
    pub fn extend_from(&mut self, buffer: &[String]) -> usize {
        let before = self.matched_rows.len();
        for (offset, line) in buffer[self.last_index_regexed..].iter().enumerate() {
            let stripped = ansi::strip_codes(line);
            if self.regex.is_match(&stripped) {
                self.matched_rows.push(self.last_index_regexed + offset);
            }
        }
        self.last_index_regexed = buffer.len();
        self.matched_rows.len() - before
    }

    /// The matched buffer indices, strictly increasing.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.matched_rows
    }

    /// Number of matched rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matched_rows.len()
    }

    /// Whether no row has matched yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matched_rows.is_empty()
    }

    /// Highest buffer index the scan has covered.
    #[must_use]
    pub fn last_index_regexed(&self) -> usize {
        self.last_index_regexed
    }

    /// The leftmost match span within an already-stripped line.
    ///
    /// Used by the renderer to wrap the match in a highlight style.
    #[must_use]
    pub fn match_span(&self, stripped: &str) -> Option<(usize, usize)> {
        self.regex.find(stripped).map(|m| (m.start(), m.end()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(FilterIndex::compile("[unclosed").is_err());
    }

    #[test]
    fn test_extend_records_matching_indices() {
        let buffer = lines(&["err1", "info2", "err3"]);
        let mut filter = FilterIndex::compile("err").unwrap();

        let new = filter.extend_from(&buffer);

        assert_eq!(new, 2);
        assert_eq!(filter.indices(), [0, 2]);
        assert_eq!(filter.last_index_regexed(), 3);
    }

    #[test]
    fn test_extend_is_incremental() {
        let mut buffer = lines(&["err1", "ok"]);
        let mut filter = FilterIndex::compile("err").unwrap();
        filter.extend_from(&buffer);

        buffer.push("err again".to_string());
        let new = filter.extend_from(&buffer);

        assert_eq!(new, 1);
        assert_eq!(filter.indices(), [0, 2]);
    }

    #[test]
    fn test_indices_strictly_increasing() {
        let buffer = lines(&["x", "x", "x", "x"]);
        let mut filter = FilterIndex::compile("x").unwrap();
        filter.extend_from(&buffer);
        assert!(filter.indices().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_color_codes_excluded_from_matching() {
        // The escape bytes must not satisfy the pattern
        let buffer = lines(&["\u{1B}[31m31m\u{1B}[0m", "plain"]);
        let mut filter = FilterIndex::compile(r"\[31m").unwrap();
        filter.extend_from(&buffer);
        assert!(filter.is_empty());

        let mut filter = FilterIndex::compile("31m").unwrap();
        filter.extend_from(&buffer);
        assert_eq!(filter.indices(), [0]);
    }

    #[test]
    fn test_pattern_that_never_matches() {
        let buffer = lines(&["a", "b", "c"]);
        let mut filter = FilterIndex::compile("zzz").unwrap();
        filter.extend_from(&buffer);
        assert!(filter.is_empty());
        assert_eq!(filter.last_index_regexed(), 3);
    }

    #[test]
    fn test_match_span_leftmost() {
        let filter = FilterIndex::compile("err").unwrap();
        assert_eq!(filter.match_span("an err and err"), Some((3, 6)));
        assert_eq!(filter.match_span("nothing"), None);
    }
}
