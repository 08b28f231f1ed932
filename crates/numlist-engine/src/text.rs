//! Stateless queries over the host buffer and caret.
//!
//! All offsets are byte offsets into the rope. Every function is total: out of
//! range offsets are clamped to the buffer.

use std::ops::Range;

use xi_rope::Rope;

use crate::geometry::Point;
use crate::host::EditorHost;

/// Keyword families that can open a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKeyword {
    /// `"1. "` opens a numbered list.
    Numbered,
    /// Reserved; bulleted lists have no trigger yet.
    Bulleted,
}

impl ListKeyword {
    /// The literal sequence that fires this keyword, if it has one.
    pub fn trigger(self) -> Option<&'static str> {
        match self {
            ListKeyword::Numbered => Some("1. "),
            ListKeyword::Bulleted => None,
        }
    }
}

/// True iff the replacement is exactly a newline.
pub fn is_return(replacement: &str) -> bool {
    replacement == "\n"
}

/// True iff the replacement is empty, i.e. the edit deletes.
pub fn is_backspace(replacement: &str) -> bool {
    replacement.is_empty()
}

/// True iff no character precedes the caret on its visual row.
///
/// This holds at the start of a logical line and also at the start of a
/// wrapped continuation row, so it asks the host's layout: the caret opens its
/// row iff hitting the far left of that row lands on the caret.
pub fn is_first_position_on_line<H: EditorHost + ?Sized>(host: &H) -> bool {
    let caret = host.caret_offset();
    let row = host.point_for_offset(caret);
    host.offset_at_point(Point::new(f64::MIN, row.y)) == caret
}

/// True iff the characters immediately before the caret are the keyword's
/// trigger sequence.
pub fn list_keyword_triggered(caret: usize, buffer: &Rope, keyword: ListKeyword) -> bool {
    trigger_range(caret, buffer, keyword).is_some()
}

/// Byte range of the trigger sequence ending at the caret, if it is there.
pub fn trigger_range(caret: usize, buffer: &Rope, keyword: ListKeyword) -> Option<Range<usize>> {
    let trigger = keyword.trigger()?;
    let caret = caret.min(buffer.len());

    let mut start = caret;
    for _ in 0..trigger.chars().count() {
        start = buffer.prev_codepoint_offset(start)?;
    }

    (buffer.slice_to_cow(start..caret) == trigger).then_some(start..caret)
}

/// Pixel-space point of the caret, from the host's layout.
pub fn caret_point<H: EditorHost + ?Sized>(host: &H) -> Point {
    host.point_for_offset(host.caret_offset())
}

/// Owned copy of `range`, clamped to the buffer.
pub fn slice_to_string(buffer: &Rope, range: Range<usize>) -> String {
    let len = buffer.len();
    let start = range.start.min(len);
    let end = range.end.min(len).max(start);
    buffer.slice_to_cow(start..end).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LayoutMetrics, MemoryHost};
    use rstest::rstest;

    #[rstest]
    #[case("\n", true)]
    #[case("", false)]
    #[case("a", false)]
    #[case("\n\n", false)]
    #[case("a\n", false)]
    fn test_is_return(#[case] replacement: &str, #[case] expected: bool) {
        assert_eq!(is_return(replacement), expected);
    }

    #[rstest]
    #[case("", true)]
    #[case(" ", false)]
    #[case("\n", false)]
    fn test_is_backspace(#[case] replacement: &str, #[case] expected: bool) {
        assert_eq!(is_backspace(replacement), expected);
    }

    /// Five columns per row, so `"abcdefg"` wraps after `e`.
    fn narrow_host(text: &str, caret: usize) -> MemoryHost {
        let metrics = LayoutMetrics {
            origin: Point::new(0.0, 0.0),
            wrap_width: 60.0,
            ..LayoutMetrics::default()
        };
        let mut host = MemoryHost::from_bytes(text.as_bytes(), metrics).unwrap();
        host.set_selection(caret..caret);
        host
    }

    #[rstest]
    #[case("", 0, true)]
    #[case("abc", 0, true)]
    #[case("abc", 1, false)]
    #[case("abc\n", 4, true)]
    #[case("abc\ndef", 5, false)]
    #[case("abc\n\n", 4, true)]
    #[case("abc\n", 99, true)]
    #[case("abcdefg", 5, true)]
    #[case("abcdefg", 6, false)]
    #[case("abcde\nx", 5, false)]
    fn test_is_first_position_on_line(
        #[case] text: &str,
        #[case] caret: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(is_first_position_on_line(&narrow_host(text, caret)), expected);
    }

    #[rstest]
    #[case("1. ", 3, true)]
    #[case("abc\n1. ", 7, true)]
    #[case("1. x", 4, false)]
    #[case("1.", 2, false)]
    #[case("2. ", 3, false)]
    #[case("", 0, false)]
    #[case("é1. ", 5, true)]
    fn test_numbered_trigger(#[case] text: &str, #[case] caret: usize, #[case] expected: bool) {
        let rope = Rope::from(text);
        assert_eq!(
            list_keyword_triggered(caret, &rope, ListKeyword::Numbered),
            expected
        );
    }

    #[test]
    fn test_trigger_range_points_at_sequence() {
        let rope = Rope::from("ab\n1. ");
        assert_eq!(trigger_range(6, &rope, ListKeyword::Numbered), Some(3..6));
    }

    #[test]
    fn test_trigger_counts_characters_not_bytes() {
        // Three bytes, but only two characters.
        let rope = Rope::from("é ");
        assert!(!list_keyword_triggered(3, &rope, ListKeyword::Numbered));
    }

    #[test]
    fn test_bulleted_keyword_never_triggers() {
        let rope = Rope::from("* ");
        assert_eq!(ListKeyword::Bulleted.trigger(), None);
        assert!(!list_keyword_triggered(2, &rope, ListKeyword::Bulleted));
    }

    #[test]
    fn test_slice_to_string_clamps() {
        let rope = Rope::from("hello\nworld");
        assert_eq!(slice_to_string(&rope, 4..7), "o\nw");
        assert_eq!(slice_to_string(&rope, 9..40), "ld");
        assert_eq!(slice_to_string(&rope, 40..50), "");
    }
}
