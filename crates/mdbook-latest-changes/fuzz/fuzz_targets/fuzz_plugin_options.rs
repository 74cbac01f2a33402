#![no_main]

//! Fuzz target for plugin option parsing
//!
//! Arbitrary `[preprocessor.latest-changes]` tables must be rejected with
//! an error, never a panic.

use libfuzzer_sys::fuzz_target;
use serde_json::Value;

use mdbook_latest_changes::config::{PluginOptions, validate_timestamp_format};

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<Value>(data) {
        if let Ok(options) = PluginOptions::from_value(Some(&value)) {
            assert!(!options.table_features.is_empty());
        }
    }

    if let Ok(format) = std::str::from_utf8(data) {
        let _ = validate_timestamp_format(format);
    }
});
