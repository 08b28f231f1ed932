use std::ops::Range;

use log::debug;

use crate::editing::Patch;
use crate::editing::options::ListOptions;
use crate::editing::tracker::ListTracker;
use crate::geometry::{Point, Rect};
use crate::host::EditorHost;
use crate::text;

/// Result of one user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The host applied the edit. The patch describes the user's replacement,
    /// not any follow-up edit the list engine made (such as stripping a
    /// trigger).
    Applied(Patch),
    /// The list engine vetoed the edit; the text is unchanged.
    Suppressed,
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied(_))
    }
}

/// Drives a [`ListTracker`] from user input against a host.
///
/// ListEditor stands in for the platform widget's event dispatch. Every edit
/// goes through the same sequence the widget would produce:
///
/// 1. pre-change ([`ListTracker::should_change_text`]), which may veto;
/// 2. the host applies the replacement and puts the caret after it;
/// 3. post-change ([`ListTracker::on_text_changed`]);
/// 4. selection-changed.
///
/// Navigation only produces selection-changed.
///
/// ```rust
/// # use numlist_engine::editing::{ListEditor, ListOptions};
/// # use numlist_engine::host::{LayoutMetrics, MemoryHost};
/// let host = MemoryHost::new(LayoutMetrics::default()).unwrap();
/// let mut editor = ListEditor::new(host, ListOptions::default());
/// editor.type_str("1. first");
/// editor.press_return();
/// editor.insert_text("second");
///
/// assert_eq!(editor.host().text_string(), "first\nsecond");
/// assert_eq!(editor.tracker().registry().len(), 2);
/// ```
#[derive(Debug)]
pub struct ListEditor<H: EditorHost> {
    host: H,
    tracker: ListTracker,
}

impl<H: EditorHost> ListEditor<H> {
    pub fn new(host: H, options: ListOptions) -> Self {
        let mut tracker = ListTracker::new(options);
        tracker.on_selection_changed(&host);
        Self { host, tracker }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct access to the host. Changes made here bypass the list engine
    /// until the next event.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn tracker(&self) -> &ListTracker {
        &self.tracker
    }

    /// Type `text` over the current selection.
    ///
    /// Multi-character strings are delivered as one edit, the way a paste
    /// would be; typing character by character goes through [`Self::type_str`].
    pub fn insert_text(&mut self, text: &str) -> EditOutcome {
        let selection = self.host.selection();
        self.replace(selection, text)
    }

    /// Type `text` one character at a time, as keystrokes.
    pub fn type_str(&mut self, text: &str) -> Vec<EditOutcome> {
        let mut buf = [0u8; 4];
        text.chars()
            .map(|ch| self.insert_text(ch.encode_utf8(&mut buf)))
            .collect()
    }

    pub fn press_return(&mut self) -> EditOutcome {
        self.insert_text("\n")
    }

    /// Delete the selection, or the character before the caret.
    ///
    /// At the very start of the document the edit is still delivered, with an
    /// empty range, so the list engine can react to it.
    pub fn backspace(&mut self) -> EditOutcome {
        let selection = self.host.selection();
        let range = if !selection.is_empty() {
            selection
        } else {
            let caret = selection.start;
            let start = self.host.text().prev_codepoint_offset(caret).unwrap_or(0);
            start..caret
        };
        self.replace(range, "")
    }

    /// Run one edit through the full event sequence.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> EditOutcome {
        let decision = self
            .tracker
            .should_change_text(&mut self.host, range.clone(), text);
        if !decision.is_allowed() {
            debug!("edit of {range:?} suppressed");
            return EditOutcome::Suppressed;
        }

        let start = range.start.min(self.host.text().len());
        let patch = self.host.replace_range(range, text);
        let caret = start + text.len();
        self.host.set_selection(caret..caret);

        self.tracker.on_text_changed(&mut self.host);
        self.tracker.on_selection_changed(&self.host);
        EditOutcome::Applied(patch)
    }

    pub fn set_caret(&mut self, offset: usize) {
        self.select(offset..offset);
    }

    pub fn select(&mut self, range: Range<usize>) {
        self.host.set_selection(range);
        self.tracker.on_selection_changed(&self.host);
    }

    pub fn move_left(&mut self) {
        let caret = self.host.caret_offset();
        let offset = self.host.text().prev_codepoint_offset(caret).unwrap_or(0);
        self.set_caret(offset);
    }

    pub fn move_right(&mut self) {
        let caret = self.host.caret_offset();
        let text = self.host.text();
        let offset = if caret >= text.len() {
            caret
        } else {
            text.next_codepoint_offset(caret).unwrap_or(caret)
        };
        self.set_caret(offset);
    }

    pub fn move_up(&mut self) {
        self.move_vertically(-1.0);
    }

    pub fn move_down(&mut self) {
        self.move_vertically(1.0);
    }

    /// The host reported the on-screen keyboard's bounds: pad the bottom of
    /// the content so the caret can scroll clear of it.
    pub fn keyboard_did_show(&mut self, bounds: Rect) {
        let inset = bounds.height + self.tracker.options().keyboard_padding;
        debug!("keyboard shown, bottom inset {inset}");
        self.host.set_bottom_inset(inset);
    }

    /// The keyboard went away; drop the padding.
    pub fn keyboard_did_hide(&mut self) {
        self.host.set_bottom_inset(0.0);
    }

    fn move_vertically(&mut self, rows: f64) {
        let point = text::caret_point(&self.host);
        let target = Point::new(point.x, point.y + rows * self.host.line_height());
        let offset = self.host.offset_at_point(target);
        self.set_caret(offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::tracker::ListType;
    use crate::geometry::LineKey;
    use crate::host::{LayoutMetrics, MemoryHost};
    use pretty_assertions::assert_eq;

    fn editor(text: &str) -> ListEditor<MemoryHost> {
        let host = MemoryHost::from_bytes(text.as_bytes(), LayoutMetrics::default()).unwrap();
        ListEditor::new(host, ListOptions::default())
    }

    #[test]
    fn test_insert_moves_caret_after_text() {
        let mut editor = editor("ac");
        editor.set_caret(1);
        let outcome = editor.insert_text("b");
        assert!(outcome.is_applied());
        assert_eq!(editor.host().text_string(), "abc");
        assert_eq!(editor.host().caret_offset(), 2);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut editor = editor("hello world");
        editor.select(0..5);
        editor.insert_text("goodbye");
        assert_eq!(editor.host().text_string(), "goodbye world");
        assert_eq!(editor.host().selection(), 7..7);
    }

    #[test]
    fn test_backspace_deletes_previous_character() {
        let mut editor = editor("a🦀");
        editor.backspace();
        assert_eq!(editor.host().text_string(), "a");
        assert_eq!(editor.host().caret_offset(), 1);
    }

    #[test]
    fn test_backspace_at_start_keeps_text() {
        let mut editor = editor("abc");
        editor.set_caret(0);
        assert!(editor.backspace().is_applied());
        assert_eq!(editor.host().text_string(), "abc");
        assert_eq!(editor.host().caret_offset(), 0);
    }

    #[test]
    fn test_suppressed_return_leaves_text_alone() {
        let mut editor = editor("");
        editor.type_str("1. ");
        let version = editor.host().version();

        assert_eq!(editor.press_return(), EditOutcome::Suppressed);
        assert_eq!(editor.host().version(), version);
        assert_eq!(editor.tracker().list_type(), ListType::Text);
    }

    #[test]
    fn test_horizontal_navigation() {
        let mut editor = editor("aé");
        editor.move_left();
        assert_eq!(editor.host().caret_offset(), 1);
        editor.move_left();
        editor.move_left();
        assert_eq!(editor.host().caret_offset(), 0);
        editor.move_right();
        editor.move_right();
        editor.move_right();
        assert_eq!(editor.host().caret_offset(), 3);
    }

    #[test]
    fn test_vertical_navigation_follows_columns() {
        let mut editor = editor("abc\ndefgh\nij");
        editor.set_caret(6);
        editor.move_up();
        assert_eq!(editor.host().caret_offset(), 2);
        editor.move_down();
        editor.move_down();
        assert_eq!(editor.host().caret_offset(), 12);
    }

    #[test]
    fn test_navigation_updates_list_type() {
        let mut editor = editor("");
        editor.type_str("1. one");
        editor.press_return();
        editor.press_return();
        assert_eq!(editor.tracker().list_type(), ListType::Text);

        editor.move_up();
        assert_eq!(editor.tracker().current_line_key(), Some(LineKey(8)));
        assert_eq!(editor.tracker().list_type(), ListType::Numbered);
    }

    #[test]
    fn test_keyboard_inset() {
        let mut editor = editor("");
        editor.keyboard_did_show(Rect::new(0.0, 400.0, 320.0, 216.0));
        assert_eq!(editor.host().bottom_inset(), 316.0);
        editor.keyboard_did_hide();
        assert_eq!(editor.host().bottom_inset(), 0.0);
    }
}
