//! Scenario tests driving the list engine through [`ListEditor`] the way a
//! user would, checking registry invariants after every step.


use crate::editing::{ListEditor, ListOptions, registry};
use crate::geometry::LineKey;
use crate::host::{LayoutMetrics, MemoryHost};

/// Editor over an empty document with default metrics: rows start at y = 8
/// and are 20 high, so row `n` has line key `8 + 20 * n`.
pub fn empty_editor() -> ListEditor<MemoryHost> {
    editor_with(ListOptions::default())
}

pub fn editor_with(options: ListOptions) -> ListEditor<MemoryHost> {
    let host = MemoryHost::new(LayoutMetrics::default()).unwrap();
    ListEditor::new(host, options)
}

/// Line key of visual row `row` under the default metrics.
pub fn row_key(row: i64) -> LineKey {
    LineKey(8 + 20 * row)
}

/// `(line key, number)` of every live item, top to bottom.
pub fn numbers(editor: &ListEditor<MemoryHost>) -> Vec<(LineKey, u32)> {
    let mut items: Vec<(LineKey, u32)> = editor
        .tracker()
        .registry()
        .iter()
        .map(|(_, item)| (item.key, item.number))
        .collect();
    items.sort();
    items
}

pub fn assert_consistent(editor: &ListEditor<MemoryHost>) {
    let registry = editor.tracker().registry();
    registry::check(registry);

    // Every live record has exactly one label and one exclusion on screen.
    assert_eq!(editor.host().labels().count(), registry.len());
    assert_eq!(editor.host().exclusions().len(), registry.len());
}
