use std::collections::BTreeMap;
use std::ops::Range;

use log::trace;
use xi_rope::{Rope, delta::Builder};

use crate::editing::Patch;
use crate::geometry::{Point, Rect};
use crate::host::layout::{self, LayoutMetrics, VisualLine};
use crate::host::{EditorHost, ExclusionId, HostError, LabelId};

/// A label overlay as the host displays it.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub frame: Rect,
    pub text: String,
}

/// In-process editing surface backed by an xi-rope buffer.
///
/// MemoryHost plays the part of the platform text widget: it stores the text
/// and selection, lays text out in a monospace grid that flows around the
/// exclusion regions, and keeps the label overlays the list engine asks for.
///
/// ```rust
/// # use numlist_engine::host::{EditorHost, LayoutMetrics, MemoryHost};
/// let mut host = MemoryHost::from_bytes(b"hello", LayoutMetrics::default()).unwrap();
/// host.replace_range(5..5, " world");
/// assert_eq!(host.text_string(), "hello world");
/// assert_eq!(host.caret_offset(), 11);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryHost {
    /// xi-rope buffer holding the whole document
    pub(crate) buffer: Rope,
    /// Selection as byte offsets; the caret is its start
    pub(crate) selection: Range<usize>,
    /// Incremented on every text replacement
    pub(crate) version: u64,
    metrics: LayoutMetrics,
    labels: BTreeMap<LabelId, Label>,
    /// Keyed by monotonically increasing ids, so iteration is append order
    exclusions: BTreeMap<ExclusionId, Rect>,
    next_handle: u64,
    bottom_inset: f64,
}

impl MemoryHost {
    /// Create an empty surface.
    pub fn new(metrics: LayoutMetrics) -> Result<Self, HostError> {
        Self::from_bytes(b"", metrics)
    }

    /// Create a surface holding `bytes`, caret at the end.
    pub fn from_bytes(bytes: &[u8], metrics: LayoutMetrics) -> Result<Self, HostError> {
        metrics.validate()?;
        let text = std::str::from_utf8(bytes)?;
        let buffer = Rope::from(text);
        let len = buffer.len();

        Ok(Self {
            buffer,
            selection: len..len,
            version: 0,
            metrics,
            labels: BTreeMap::new(),
            exclusions: BTreeMap::new(),
            next_handle: 0,
            bottom_inset: 0.0,
        })
    }

    pub fn text_string(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn labels(&self) -> impl Iterator<Item = (&LabelId, &Label)> {
        self.labels.iter()
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(&id)
    }

    /// Exclusion regions in the order they were appended.
    pub fn exclusions(&self) -> Vec<Rect> {
        self.exclusions.values().copied().collect()
    }

    pub fn bottom_inset(&self) -> f64 {
        self.bottom_inset
    }

    /// Current visual rows, for rendering.
    pub fn visual_lines(&self) -> Vec<VisualLine> {
        layout::layout_lines(&self.text_string(), &self.metrics, &self.exclusions())
    }

    /// Offset of the character boundary before `offset`, if any.
    pub fn prev_offset(&self, offset: usize) -> Option<usize> {
        self.buffer
            .prev_codepoint_offset(offset.min(self.buffer.len()))
    }

    /// Offset of the character boundary after `offset`, if any.
    pub fn next_offset(&self, offset: usize) -> Option<usize> {
        if offset >= self.buffer.len() {
            return None;
        }
        self.buffer.next_codepoint_offset(offset)
    }

    fn snap_to_boundary(&self, offset: usize) -> usize {
        let text = self.text_string();
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl EditorHost for MemoryHost {
    fn text(&self) -> &Rope {
        &self.buffer
    }

    fn caret_offset(&self) -> usize {
        self.selection.start
    }

    fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Clamped to the document and snapped back to character boundaries.
    fn set_selection(&mut self, selection: Range<usize>) {
        let start = self.snap_to_boundary(selection.start);
        let end = self.snap_to_boundary(selection.end).max(start);
        self.selection = start..end;
    }

    fn line_height(&self) -> f64 {
        self.metrics.line_height
    }

    fn point_for_offset(&self, offset: usize) -> Point {
        let text = self.text_string();
        let lines = layout::layout_lines(&text, &self.metrics, &self.exclusions());
        layout::point_for_offset(&lines, &text, offset, &self.metrics)
    }

    fn offset_at_point(&self, point: Point) -> usize {
        let text = self.text_string();
        let lines = layout::layout_lines(&text, &self.metrics, &self.exclusions());
        layout::offset_at_point(&lines, &text, point, &self.metrics)
    }

    fn replace_range(&mut self, range: Range<usize>, text: &str) -> Patch {
        let len = self.buffer.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        let edited = start..end;

        let mut builder = Builder::new(len);
        if text.is_empty() {
            builder.delete(edited.clone());
        } else {
            builder.replace(edited.clone(), Rope::from(text));
        }
        let delta = builder.build();
        self.buffer = delta.apply(&self.buffer);

        let changed = if text.is_empty() {
            Vec::new()
        } else {
            vec![start..start + text.len()]
        };

        self.selection = transform_offset(self.selection.start, &edited, text.len())
            ..transform_offset(self.selection.end, &edited, text.len());
        self.version += 1;

        Patch {
            changed,
            new_selection: self.selection.clone(),
            version: self.version,
        }
    }

    fn add_label(&mut self, frame: Rect, text: &str) -> LabelId {
        let id = LabelId(self.next_handle());
        self.labels.insert(
            id,
            Label {
                frame,
                text: text.to_string(),
            },
        );
        id
    }

    fn remove_label(&mut self, id: LabelId) {
        if self.labels.remove(&id).is_none() {
            trace!("label {id:?} already removed");
        }
    }

    fn add_exclusion(&mut self, region: Rect) -> ExclusionId {
        let id = ExclusionId(self.next_handle());
        self.exclusions.insert(id, region);
        id
    }

    fn remove_exclusion(&mut self, id: ExclusionId) {
        if self.exclusions.remove(&id).is_none() {
            trace!("exclusion {id:?} already removed");
        }
    }

    fn set_bottom_inset(&mut self, inset: f64) {
        self.bottom_inset = inset;
    }
}

/// Map an offset through the replacement of `edited` by `inserted` bytes.
///
/// Offsets at or after the end of the edited range shift with it, offsets
/// inside it collapse to the end of the inserted text.
fn transform_offset(offset: usize, edited: &Range<usize>, inserted: usize) -> usize {
    if offset >= edited.end {
        offset - (edited.end - edited.start) + inserted
    } else if offset > edited.start {
        edited.start + inserted
    } else {
        offset
    }
}
