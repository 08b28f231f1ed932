pub mod editing;
pub mod geometry;
pub mod host;
pub mod text;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{EditDecision, EditOutcome, ListEditor, ListOptions, ListTracker, ListType};
pub use geometry::{LineKey, Point, Rect};
pub use host::{EditorHost, HostError, LayoutMetrics, MemoryHost};
