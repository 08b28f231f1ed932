// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use numlist_engine::editing::{ListEditor, ListOptions};
use numlist_engine::host::{LayoutMetrics, MemoryHost};

#[allow(dead_code)]
pub fn empty_editor() -> ListEditor<MemoryHost> {
    let host = MemoryHost::new(LayoutMetrics::default()).unwrap();
    ListEditor::new(host, ListOptions::default())
}

/// Type a numbered list of `items` entries, each `words` words long.
#[allow(dead_code)]
pub fn type_list(editor: &mut ListEditor<MemoryHost>, items: usize, words: usize) {
    editor.type_str("1. ");
    for item in 0..items {
        let line = vec!["lorem"; words].join(" ");
        editor.type_str(&line);
        if item + 1 < items {
            editor.press_return();
        }
    }
}
