#![no_main]

//! Fuzz target for table cell escaping
//!
//! An escaped cell must never break the row it sits in: no raw pipes,
//! no line breaks and no unescaped HTML.

use libfuzzer_sys::fuzz_target;

use mdbook_latest_changes::marker::{MARKER, substitute};
use mdbook_latest_changes::table::escape_cell;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let cell = escape_cell(text);
    assert!(!cell.contains('\n'));
    assert!(!cell.contains('\r'));
    assert!(!cell.contains('<'));
    assert!(!cell.contains('>'));
    // Every pipe is escaped and every backslash escapes a pipe
    let bytes = cell.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'|' => assert!(i > 0 && bytes[i - 1] == b'\\'),
            b'\\' => assert_eq!(bytes.get(i + 1), Some(&b'|')),
            _ => {}
        }
    }
    assert_eq!(cell.matches('|').count(), text.matches('|').count());

    // Substitution never touches text without the marker
    if !text.contains(MARKER) {
        assert_eq!(substitute(text, MARKER, "table"), text);
    }
});
