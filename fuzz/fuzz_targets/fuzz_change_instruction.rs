#![no_main]
// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target for change resolution from instruction text
//!
//! Tests:
//! - Arbitrary instruction text never panics
//! - A resolved change rolls back to its before-state

use docshift::diff::merge_documents;
use docshift::{Change, Command, documents_equal, parse_document};
use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let serde_json::Value::Object(before) = json!({
        "a": "foo",
        "c": [1, 2, 3],
        "e": {"f": "foo", "g": 7.8}
    }) else {
        return;
    };

    let mut change = Change::from_instruction("fuzz/doc", Some(before.clone()), text, Command::Unknown);
    let Ok(resolution) = change.resolve() else {
        assert!(change.error().is_some());
        return;
    };

    let rollback = parse_document(&resolution.rollback).expect("rollback parses");
    let restored = merge_documents(&resolution.after, &rollback);
    assert!(
        documents_equal(&restored, &before),
        "rollback failed for {text:?}: {restored:?}"
    );
});
