//! Property-based tests for the engine's pure pieces.
//!
//! Fuzzes the delete-specification resolver, the visible-window computation,
//! the history tape, and the command-line editor to check their invariants
//! hold for arbitrary inputs.

use proptest::prelude::*;

use logria::commands::resolve_delete_command;
use logria::history::HistoryTape;
use logria::tui::render::{determine_position, visible_indices, Follow, SeqRef};

fn follow_strategy() -> impl Strategy<Value = Follow> {
    prop_oneof![
        Just(Follow::Tail),
        Just(Follow::Top),
        Just(Follow::Manual),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// The resolver never panics and always yields a sorted, duplicate-free
    /// result.
    #[test]
    fn resolver_handles_arbitrary_input(spec in ".*") {
        let resolved = resolve_delete_command(&spec);
        prop_assert!(resolved.windows(2).all(|w| w[0] < w[1]));
    }

    /// Every number in a well-formed specification is covered by the union.
    #[test]
    fn resolver_covers_ranges(start in 1usize..50, len in 0usize..10, single in 1usize..100) {
        let end = start + len;
        let spec = format!(":r {start}-{end},{single}");
        let resolved = resolve_delete_command(&spec);
        for i in start..=end {
            prop_assert!(resolved.contains(&i));
        }
        prop_assert!(resolved.contains(&single));
    }

    /// The window never escapes the sequence and the scroll position stays
    /// within `[0, len]`.
    #[test]
    fn window_stays_in_bounds(
        len in 0usize..300,
        current_end in 0usize..400,
        last_row in 1usize..40,
        width in 1usize..200,
        follow in follow_strategy(),
    ) {
        let lines: Vec<String> = (0..len).map(|i| format!("line {i}")).collect();
        let seq = SeqRef::Slice(&lines);

        let window = determine_position(&seq, follow, current_end, last_row, width);

        prop_assert!(window.current_end <= len);
        prop_assert!(window.start >= -1);
        if len > 0 {
            prop_assert!(window.end <= len);
        }

        let visible = visible_indices(&seq, window, last_row, width);
        prop_assert!(visible.len() <= last_row);
        prop_assert!(visible.windows(2).all(|w| w[0] + 1 == w[1]));
        for index in &visible {
            prop_assert!(*index < len);
        }
    }

    /// In tail mode the last line is always visible when one exists.
    #[test]
    fn tail_mode_shows_last_line(
        len in 1usize..300,
        last_row in 1usize..40,
    ) {
        let lines: Vec<String> = (0..len).map(|i| format!("line {i}")).collect();
        let seq = SeqRef::Slice(&lines);

        let window = determine_position(&seq, Follow::Tail, 0, last_row, 80);
        let visible = visible_indices(&seq, window, last_row, 80);

        prop_assert_eq!(*visible.last().unwrap(), len - 1);
    }

    /// The history tape never holds consecutive duplicates, whatever the
    /// submission order.
    #[test]
    fn history_never_repeats_consecutively(items in prop::collection::vec("[a-z :]{0,12}", 0..50)) {
        let mut tape = HistoryTape::in_memory();
        for item in &items {
            tape.add(item);
        }
        let all = tape.tail(tape.len());
        prop_assert!(all.windows(2).all(|w| w[0] != w[1]));
        prop_assert!(!all.iter().any(|i| i == ":history" || i == ":history off"));
    }

    /// Scrolling the tape in any pattern keeps the cursor on a real item.
    #[test]
    fn history_cursor_stays_valid(
        items in prop::collection::vec("[a-z]{1,8}", 1..20),
        moves in prop::collection::vec(any::<bool>(), 0..60),
    ) {
        let mut tape = HistoryTape::in_memory();
        for item in &items {
            tape.add(item);
        }
        for back in moves {
            if back {
                tape.scroll_back();
            } else {
                tape.scroll_forward();
            }
            if !tape.is_empty() {
                // current() always resolves to a stored item or empty-at-end
                let current = tape.current();
                prop_assert!(current.is_empty() || tape.tail(tape.len()).contains(&current));
            }
        }
    }
}
