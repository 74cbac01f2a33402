// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Marker token substitution

/// Placeholder replaced by the changes table
pub const MARKER: &str = "{{ latest_changes }}";

/// Whether the page asks for a changes table
#[must_use]
pub fn contains_marker(page_text: &str) -> bool {
    page_text.contains(MARKER)
}

/// Replace every literal occurrence of `marker` with `replacement`
#[must_use]
pub fn substitute(page_text: &str, marker: &str, replacement: &str) -> String {
    if marker.is_empty() {
        return page_text.to_string();
    }
    page_text.replace(marker, replacement)
}
