//! # Host Boundary
//!
//! The list engine never owns text storage, layout or rendering. Everything it
//! needs from the editing widget goes through [`EditorHost`]:
//!
//! - **Read**: document text, caret offset, line metrics, and the pixel point
//!   of any text offset (the host's layout engine).
//! - **Mutate**: replace a text range, add/remove label overlays, add/remove
//!   layout exclusion regions, adjust the bottom content inset.
//!
//! [`MemoryHost`] is a complete in-process implementation with a monospace
//! layout, used by the terminal front end, the tests and the benchmarks.

pub mod layout;
pub mod memory;

use std::ops::Range;

use xi_rope::Rope;

use crate::editing::Patch;
use crate::geometry::{Point, Rect};

pub use layout::{LayoutMetrics, VisualLine};
pub use memory::{Label, MemoryHost};

/// Handle to a label overlay inserted into the host's view hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u64);

/// Handle to a region appended to the host's layout exclusion set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExclusionId(pub u64);

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("invalid layout metrics: {reason}")]
    InvalidMetrics { reason: String },
}

/// Primitives the host editing widget provides to the list engine.
pub trait EditorHost {
    /// Current text content.
    fn text(&self) -> &Rope;

    /// Byte offset of the caret (start of the selection).
    fn caret_offset(&self) -> usize;

    fn selection(&self) -> Range<usize>;

    fn set_selection(&mut self, selection: Range<usize>);

    fn line_height(&self) -> f64;

    /// Pixel-space top-left point of the caret placed at `offset`.
    fn point_for_offset(&self, offset: usize) -> Point;

    /// Hit test: the text offset nearest to a pixel-space point.
    fn offset_at_point(&self, point: Point) -> usize;

    /// Replace `range` with `text`, transforming the selection through the edit.
    fn replace_range(&mut self, range: Range<usize>, text: &str) -> Patch;

    fn add_label(&mut self, frame: Rect, text: &str) -> LabelId;

    fn remove_label(&mut self, id: LabelId);

    fn add_exclusion(&mut self, region: Rect) -> ExclusionId;

    fn remove_exclusion(&mut self, id: ExclusionId);

    fn set_bottom_inset(&mut self, inset: f64);
}
