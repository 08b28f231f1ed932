use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::host::HostError;

/// Font and container metrics for the monospace layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Top-left of the text container inside the view.
    pub origin: Point,
    pub line_height: f64,
    pub char_width: f64,
    /// Width of the text container; rows wrap inside it.
    pub wrap_width: f64,
    /// Horizontal inset applied on both sides of every row.
    pub line_fragment_padding: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            origin: Point::new(0.0, 8.0),
            line_height: 20.0,
            char_width: 10.0,
            wrap_width: 320.0,
            line_fragment_padding: 5.0,
        }
    }
}

impl LayoutMetrics {
    /// Reject metrics that would make layout degenerate.
    pub fn validate(&self) -> Result<(), HostError> {
        let positive = [
            ("line_height", self.line_height),
            ("char_width", self.char_width),
            ("wrap_width", self.wrap_width),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(HostError::InvalidMetrics {
                    reason: format!("{name} must be a positive number, got {value}"),
                });
            }
        }
        if !self.line_fragment_padding.is_finite() || self.line_fragment_padding < 0.0 {
            return Err(HostError::InvalidMetrics {
                reason: format!(
                    "line_fragment_padding must not be negative, got {}",
                    self.line_fragment_padding
                ),
            });
        }
        if self.line_fragment_padding * 2.0 >= self.wrap_width {
            return Err(HostError::InvalidMetrics {
                reason: "line_fragment_padding leaves no room for text".to_string(),
            });
        }
        Ok(())
    }

    fn row_top(&self, row: usize) -> f64 {
        self.origin.y + row as f64 * self.line_height
    }

    fn text_left(&self) -> f64 {
        self.origin.x + self.line_fragment_padding
    }

    fn text_right(&self) -> f64 {
        self.origin.x + self.wrap_width - self.line_fragment_padding
    }

    /// Left edge of a row's text: pushed right by every exclusion region that
    /// overlaps the row's band.
    fn row_left(&self, top: f64, exclusions: &[Rect]) -> f64 {
        exclusions
            .iter()
            .filter(|region| region.intersects_band(top, self.line_height))
            .map(Rect::max_x)
            .fold(self.text_left(), f64::max)
    }

    fn columns_from(&self, left: f64) -> usize {
        ((self.text_right() - left) / self.char_width).floor().max(1.0) as usize
    }
}

/// One laid-out row of text.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLine {
    /// Byte range of the row's characters, newline excluded.
    pub range: Range<usize>,
    /// Left edge of the row's text and top of the row.
    pub origin: Point,
    pub row: usize,
}

/// Lay `text` out into visual rows.
///
/// Logical lines split on `\n`; every logical line produces at least one row.
pub fn layout_lines(text: &str, metrics: &LayoutMetrics, exclusions: &[Rect]) -> Vec<VisualLine> {
    let mut lines = Vec::new();
    let mut row = 0;
    let mut line_start = 0;

    for logical in text.split('\n') {
        let end = line_start + logical.len();
        let mut start = line_start;
        loop {
            let top = metrics.row_top(row);
            let left = metrics.row_left(top, exclusions);
            let columns = metrics.columns_from(left);
            let split = start + byte_offset_after_chars(&text[start..end], columns);

            lines.push(VisualLine {
                range: start..split,
                origin: Point::new(left, top),
                row,
            });
            row += 1;

            if split >= end {
                break;
            }
            start = split;
        }
        line_start = end + 1;
    }

    lines
}

/// Pixel point of a caret at `offset`.
///
/// A caret sitting on an interior wrap boundary belongs to the following row;
/// a caret at the end of a logical line stays on that line's last row.
pub fn point_for_offset(
    lines: &[VisualLine],
    text: &str,
    offset: usize,
    metrics: &LayoutMetrics,
) -> Point {
    let offset = offset.min(text.len());
    let Some(line) = lines
        .iter()
        .rev()
        .find(|line| line.range.start <= offset && offset <= line.range.end)
    else {
        return Point::new(metrics.text_left(), metrics.origin.y);
    };

    let column = char_count(text, line.range.start..offset);
    Point::new(
        line.origin.x + column as f64 * metrics.char_width,
        line.origin.y,
    )
}

/// Nearest text offset to `point`: the row under the point (clamped to the
/// first/last row), then the closest column on that row.
pub fn offset_at_point(
    lines: &[VisualLine],
    text: &str,
    point: Point,
    metrics: &LayoutMetrics,
) -> usize {
    let Some(last) = lines.last() else {
        return 0;
    };
    let index = lines
        .iter()
        .position(|line| point.y < line.origin.y + metrics.line_height)
        .unwrap_or(last.row);
    let line = &lines[index];

    let count = char_count(text, line.range.clone());
    let wraps_into_next = lines
        .get(index + 1)
        .is_some_and(|next| next.range.start == line.range.end);
    let max_column = if wraps_into_next {
        count.saturating_sub(1)
    } else {
        count
    };

    let column = ((point.x - line.origin.x) / metrics.char_width)
        .round()
        .clamp(0.0, max_column as f64) as usize;
    line.range.start + byte_offset_after_chars(&text[line.range.clone()], column)
}

fn byte_offset_after_chars(s: &str, chars: usize) -> usize {
    s.char_indices()
        .nth(chars)
        .map(|(index, _)| index)
        .unwrap_or(s.len())
}

fn char_count(text: &str, range: Range<usize>) -> usize {
    text.get(range).map(|s| s.chars().count()).unwrap_or(0)
}
