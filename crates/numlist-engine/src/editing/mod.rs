//! # Numbered List Editing
//!
//! The list engine proper. Given a host editing surface ([`crate::host`]), it
//! turns a line into a numbered list item when the user types `"1. "`,
//! continues the list on return, wraps long items onto continuation lines,
//! and drops items when their line is merged away or the user leaves the
//! list.
//!
//! ## Module Structure
//!
//! - **`tracker`**: `ListTracker`, the state machine fed by the host's edit
//!   and caret events
//! - **`registry`**: arena of `ListItem` records and the line key map
//! - **`decoration`**: draws the numbered prefix (label plus exclusion region)
//! - **`editor`**: `ListEditor`, replays host event order for a concrete host
//! - **`options`**: tunables (`ListOptions`, `RenumberPolicy`)
//! - **`patch`**: result metadata of an applied edit
//!
//! ## Usage Pattern
//!
//! ```rust
//! use numlist_engine::editing::*;
//! use numlist_engine::host::{LayoutMetrics, MemoryHost};
//!
//! let host = MemoryHost::new(LayoutMetrics::default()).unwrap();
//! let mut editor = ListEditor::new(host, ListOptions::default());
//!
//! // The trigger is consumed and replaced by a decoration.
//! editor.type_str("1. milk");
//! assert_eq!(editor.tracker().list_type(), ListType::Numbered);
//!
//! // Return continues the list.
//! editor.press_return();
//! editor.type_str("eggs");
//!
//! // Return on an empty item leaves the list without inserting a newline.
//! editor.press_return();
//! assert_eq!(editor.press_return(), EditOutcome::Suppressed);
//! assert_eq!(editor.tracker().list_type(), ListType::Text);
//! assert_eq!(editor.host().text_string(), "milk\neggs\n");
//! ```

pub mod decoration;
pub mod editor;
pub mod options;
pub mod patch;
pub mod registry;
pub mod tracker;

pub use decoration::{Decoration, DecorationRenderer, DecorationStyle, label_text};
pub use editor::{EditOutcome, ListEditor};
pub use options::{ListOptions, RenumberPolicy};
pub use patch::Patch;
pub use registry::{ItemId, ListItem, ListRegistry};
pub use tracker::{EditDecision, ListTracker, ListType, PendingEdit};
