use serde::{Deserialize, Serialize};

/// A pixel-space point in the editing surface's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// True if the rectangle overlaps the horizontal band `[top, top + height)`.
    pub fn intersects_band(&self, top: f64, height: f64) -> bool {
        self.y < top + height && self.max_y() > top
    }
}

/// Identity of a visual line: its vertical position quantized to a layout unit.
///
/// Raw caret coordinates are floating point and jitter slightly between layout
/// passes, so they are never used as map keys directly. Two positions that
/// round to the same multiple of the unit share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey(pub i64);

impl LineKey {
    /// Quantize a vertical position. A non-positive or non-finite unit falls
    /// back to one pixel.
    pub fn quantize(y: f64, unit: f64) -> Self {
        let unit = effective_unit(unit);
        LineKey((y / unit).round() as i64)
    }
}

fn effective_unit(unit: f64) -> f64 {
    if unit.is_finite() && unit > 0.0 {
        unit
    } else {
        1.0
    }
}
