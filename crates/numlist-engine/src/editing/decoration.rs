//! Numbered-prefix decorations: a label overlay plus the exclusion region
//! that keeps editable text from running underneath it.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::editing::registry::{ItemId, ListItem, ListRegistry};
use crate::geometry::{LineKey, Rect};
use crate::host::{EditorHost, ExclusionId, LabelId};

/// Geometry of the numbered prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationStyle {
    /// Left edge of the label and its exclusion region.
    pub x: f64,
    /// Added to the line height to get the width for one or two digits.
    pub base_padding: f64,
    /// Extra width for every digit beyond two.
    pub per_extra_digit: f64,
    /// Height of the exclusion region; kept small so it only affects the
    /// row it starts on.
    pub exclusion_height: f64,
}

impl Default for DecorationStyle {
    fn default() -> Self {
        Self {
            x: 8.0,
            base_padding: 10.0,
            per_extra_digit: 10.0,
            exclusion_height: 2.0,
        }
    }
}

impl DecorationStyle {
    pub fn width(&self, line_height: f64, number: u32) -> f64 {
        let mut width = line_height + self.base_padding;
        if number >= 100 {
            let digits = number.to_string().len();
            width += (digits - 2) as f64 * self.per_extra_digit;
        }
        width
    }
}

/// What the renderer put on screen for one list item.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub label: LabelId,
    pub exclusion: ExclusionId,
    pub frame: Rect,
    pub exclusion_region: Rect,
    pub text: String,
}

/// Label text for `number`: single digits are padded to line up with two-digit
/// numbers.
pub fn label_text(number: u32) -> String {
    if number < 10 {
        format!("  {number}.")
    } else {
        format!("{number}.")
    }
}

/// Creates and removes decorations through the host, keeping the registry in
/// step with what is on screen.
#[derive(Debug, Clone, Default)]
pub struct DecorationRenderer {
    style: DecorationStyle,
}

impl DecorationRenderer {
    pub fn new(style: DecorationStyle) -> Self {
        Self { style }
    }

    /// Draw a prefix for `number` on the line at `y` and register it under `key`.
    ///
    /// A record previously registered under the same primary key is replaced
    /// and its decoration released.
    pub fn create<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        registry: &mut ListRegistry,
        key: LineKey,
        y: f64,
        number: u32,
    ) -> ItemId {
        let decoration = self.draw(host, y, number);
        let (id, evicted) = registry.insert(ListItem::new(key, number, decoration));
        self.release(host, evicted);
        debug!("created list item {number} at {key:?}");
        id
    }

    /// Remove the record's label, exclusion region and every key it owns.
    pub fn remove<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        registry: &mut ListRegistry,
        id: ItemId,
    ) -> Option<ListItem> {
        let item = registry.remove(id)?;
        erase(host, &item.decoration);
        debug!("removed list item {} at {:?}", item.number, item.key);
        Some(item)
    }

    /// Remove whatever record `key` resolves to.
    pub fn remove_at<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        registry: &mut ListRegistry,
        key: LineKey,
    ) -> Option<ListItem> {
        let Some(id) = registry.lookup(key) else {
            trace!("no list item at {key:?}");
            return None;
        };
        self.remove(host, registry, id)
    }

    /// Redraw a record's prefix with a new number. Keys and links are kept.
    pub fn relabel<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        registry: &mut ListRegistry,
        id: ItemId,
        number: u32,
    ) -> bool {
        let Some(item) = registry.get(id) else {
            return false;
        };
        if item.number == number {
            return true;
        }
        let y = item.decoration.frame.y;
        let old = item.decoration.clone();

        erase(host, &old);
        let decoration = self.draw(host, y, number);
        if let Some(item) = registry.get_mut(id) {
            item.number = number;
            item.decoration = decoration;
        }
        true
    }

    /// Release the decoration of a record the registry evicted.
    pub fn release<H: EditorHost + ?Sized>(&self, host: &mut H, evicted: Option<ListItem>) {
        if let Some(item) = evicted {
            debug!("replacing list item {} at {:?}", item.number, item.key);
            erase(host, &item.decoration);
        }
    }

    fn draw<H: EditorHost + ?Sized>(&self, host: &mut H, y: f64, number: u32) -> Decoration {
        let line_height = host.line_height();
        let width = self.style.width(line_height, number);
        let frame = Rect::new(self.style.x, y, width, line_height);
        let exclusion_region = Rect::new(self.style.x, y, width, self.style.exclusion_height);
        let text = label_text(number);

        let label = host.add_label(frame, &text);
        let exclusion = host.add_exclusion(exclusion_region);

        Decoration {
            label,
            exclusion,
            frame,
            exclusion_region,
            text,
        }
    }
}

fn erase<H: EditorHost + ?Sized>(host: &mut H, decoration: &Decoration) {
    host.remove_label(decoration.label);
    host.remove_exclusion(decoration.exclusion);
}
