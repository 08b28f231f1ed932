//! # List State Machine
//!
//! [`ListTracker`] reacts to the host's editing events and decides which lines
//! are numbered list items. The host calls it at three points per keystroke:
//!
//! 1. **Pre-change** ([`ListTracker::should_change_text`]): classifies the edit,
//!    sets the pending flags, may remove a decoration up front, and may veto
//!    the edit ([`EditDecision::Suppress`]).
//! 2. **Post-change** ([`ListTracker::on_text_changed`]): after the host has
//!    applied the edit; converts a typed trigger into a list item, continues
//!    the list after a return, removes the decoration of a merged-away line.
//! 3. **Selection changed** ([`ListTracker::on_selection_changed`]): tracks the
//!    caret's line. Also fires on plain navigation.
//!
//! ## Why the flags
//!
//! A caret that changes line during an edit means something different from a
//! caret moved by navigation. `text_will_change`, `pending_return` and
//! `pending_backspace` carry that context from pre-change to the caret events:
//!
//! - navigation, or a backspace merging lines: reclassify the new line from
//!   the registry;
//! - ordinary typing that wrapped onto a new row: the new row is a
//!   continuation of the item on the previous row and gets registered as an
//!   auxiliary key;
//! - a return: handled in post-change, where the new item is numbered.
//!
//! Post-change re-reads the caret from the host first, so it behaves the same
//! whether the host delivers selection-changed before or after text-changed.

use std::ops::Range;

use log::{debug, trace};

use crate::editing::decoration::DecorationRenderer;
use crate::editing::options::{ListOptions, RenumberPolicy};
use crate::editing::registry::{ItemId, ListItem, ListRegistry};
use crate::geometry::{LineKey, Point};
use crate::host::EditorHost;
use crate::text::{self, ListKeyword};

/// What kind of line the caret is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListType {
    #[default]
    None,
    /// Explicitly left a list by pressing return on an empty item.
    Text,
    Numbered,
}

/// Answer to the host's pre-change hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditDecision {
    /// Apply the edit.
    Allow,
    /// Drop the edit; the host must not change the text.
    Suppress,
}

impl EditDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, EditDecision::Allow)
    }
}

/// Context carried between the events of one edit, plus caret tracking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingEdit {
    pub pending_return: bool,
    pub pending_backspace: bool,
    pub text_will_change: bool,
    pub is_first_position_on_line: bool,
    /// Text covered by a pending deletion, inspected after commit for newlines.
    pub pending_deleted_text: Option<String>,
    pub current_point: Option<Point>,
    pub previous_point: Option<Point>,
    /// Key of the line the caret last left.
    pub previous_line_key: Option<LineKey>,
    pub list_type: ListType,
}

/// Numbered-list state machine bound to one editor.
#[derive(Debug, Default)]
pub struct ListTracker {
    registry: ListRegistry,
    renderer: DecorationRenderer,
    options: ListOptions,
    state: PendingEdit,
}

impl ListTracker {
    pub fn new(options: ListOptions) -> Self {
        Self {
            registry: ListRegistry::new(),
            renderer: DecorationRenderer::new(options.decoration.clone()),
            options,
            state: PendingEdit::default(),
        }
    }

    pub fn registry(&self) -> &ListRegistry {
        &self.registry
    }

    pub fn state(&self) -> &PendingEdit {
        &self.state
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn list_type(&self) -> ListType {
        self.state.list_type
    }

    pub fn line_key(&self, y: f64) -> LineKey {
        LineKey::quantize(y, self.options.line_key_unit)
    }

    pub fn current_line_key(&self) -> Option<LineKey> {
        self.state.current_point.map(|point| self.line_key(point.y))
    }

    /// The record decorating the caret's line, if any.
    pub fn current_item(&self) -> Option<&ListItem> {
        self.current_line_key()
            .and_then(|key| self.registry.item_at(key))
    }

    /// Pre-change hook: `range` is about to be replaced by `replacement`.
    pub fn should_change_text<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        range: Range<usize>,
        replacement: &str,
    ) -> EditDecision {
        self.on_selection_changed(host);

        let caret = host.caret_offset();
        self.state.is_first_position_on_line = text::is_first_position_on_line(host);

        if text::is_return(replacement) {
            self.state.pending_return = true;

            if self.state.list_type == ListType::Numbered && self.state.is_first_position_on_line {
                if let Some(key) = self.current_line_key() {
                    self.remove_item_at(host, key);
                    debug!("return on empty list item at {key:?}, leaving list");
                }
                self.state.list_type = ListType::Text;
                self.state.pending_return = false;
                return EditDecision::Suppress;
            }
        }

        if text::is_backspace(replacement) {
            self.state.pending_backspace = true;

            if caret == 0 {
                if let Some(key) = self.current_line_key()
                    && self.remove_item_at(host, key).is_some()
                {
                    self.state.list_type = self.classify(key);
                }
            } else {
                self.state.pending_deleted_text = Some(text::slice_to_string(host.text(), range));
            }
        }

        self.state.text_will_change = true;
        EditDecision::Allow
    }

    /// Post-change hook: the host has applied the edit.
    pub fn on_text_changed<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        self.on_selection_changed(host);

        if let Some(range) =
            text::trigger_range(host.caret_offset(), host.text(), ListKeyword::Numbered)
        {
            host.replace_range(range, "");
            self.on_selection_changed(host);
            self.start_list(host);
        }

        if self.state.pending_return {
            if self.state.list_type == ListType::Numbered {
                self.continue_list(host);
            }
            self.state.pending_return = false;
        }

        if self.state.pending_backspace {
            let deleted = self.state.pending_deleted_text.take();
            match (deleted, self.state.previous_line_key) {
                (Some(deleted), Some(key)) if deleted.contains('\n') => {
                    debug!("line merged away at {key:?}");
                    self.remove_item_at(host, key);
                }
                (None, _) => trace!("backspace without captured text"),
                _ => {}
            }
            self.state.pending_backspace = false;
        }

        self.state.text_will_change = false;
    }

    /// Selection hook: read the caret point from the host's layout.
    pub fn on_selection_changed<H: EditorHost + ?Sized>(&mut self, host: &H) {
        self.on_caret_moved(text::caret_point(host));
    }

    /// Track the caret and react when it changes line.
    pub fn on_caret_moved(&mut self, point: Point) {
        if self.state.current_point == Some(point) {
            return;
        }
        self.state.previous_point = self.state.current_point.replace(point);
        let Some(previous) = self.state.previous_point else {
            return;
        };

        let new_key = self.line_key(point.y);
        let old_key = self.line_key(previous.y);
        if new_key == old_key {
            return;
        }
        self.state.previous_line_key = Some(old_key);

        if !self.state.text_will_change || self.state.pending_backspace {
            self.state.list_type = self.classify(new_key);
            trace!("caret moved to {new_key:?}: {:?}", self.state.list_type);
            return;
        }

        if !self.state.pending_return
            && let Some(id) = self.registry.lookup(old_key)
            && self.registry.add_auxiliary_key(id, new_key)
        {
            debug!("list item at {old_key:?} wrapped onto {new_key:?}");
        }
    }

    /// Renumber every item after `id` along the chain, `previous + 1` each.
    pub fn renumber_from<H: EditorHost + ?Sized>(&mut self, host: &mut H, id: ItemId) {
        let mut current = id;
        for _ in 0..self.registry.len() {
            let Some(item) = self.registry.get(current) else {
                return;
            };
            let (number, next) = (item.number + 1, item.next);
            let Some(next) = next else {
                return;
            };
            self.renderer
                .relabel(host, &mut self.registry, next, number);
            current = next;
        }
    }

    fn classify(&self, key: LineKey) -> ListType {
        if self.registry.lookup(key).is_some() {
            ListType::Numbered
        } else {
            ListType::None
        }
    }

    fn start_list<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        let Some(point) = self.state.current_point else {
            return;
        };
        let key = self.line_key(point.y);
        self.renderer
            .create(host, &mut self.registry, key, point.y, 1);
        self.state.list_type = ListType::Numbered;
        self.on_selection_changed(host);
    }

    fn continue_list<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        let Some(previous_key) = self.state.previous_line_key else {
            trace!("return in list without a previous line");
            return;
        };
        let Some(previous) = self.registry.lookup(previous_key) else {
            trace!("return in list but no item at {previous_key:?}");
            return;
        };
        let Some(number) = self.registry.get(previous).map(|item| item.number + 1) else {
            return;
        };
        let Some(point) = self.state.current_point else {
            return;
        };
        let key = self.line_key(point.y);
        if key == previous_key {
            trace!("return did not move the caret off {key:?}");
            return;
        }

        let id = self
            .renderer
            .create(host, &mut self.registry, key, point.y, number);
        self.registry.link_after(previous, id);

        if self.options.renumber == RenumberPolicy::FollowChain {
            self.renumber_from(host, id);
        }
        self.on_selection_changed(host);
    }

    fn remove_item_at<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        key: LineKey,
    ) -> Option<ListItem> {
        let removed = self.renderer.remove_at(host, &mut self.registry, key)?;

        if self.options.renumber == RenumberPolicy::FollowChain
            && let Some(next) = removed.next.filter(|next| self.registry.get(*next).is_some())
        {
            let number = removed
                .previous
                .and_then(|previous| self.registry.get(previous))
                .map_or(1, |previous| previous.number + 1);
            self.renderer
                .relabel(host, &mut self.registry, next, number);
            self.renumber_from(host, next);
        }

        self.on_selection_changed(host);
        Some(removed)
    }
}
