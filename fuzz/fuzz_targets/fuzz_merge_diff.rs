#![no_main]
// SPDX-License-Identifier: MIT OR Apache-2.0
//! libFuzzer target for merge diff / merge patch
//!
//! Tests:
//! - merge(a, diff(a, b)) == b when b stores no nulls inside objects
//! - diff(a, a) is empty
//! - No panics on non-object roots

use docshift_core::{Document, as_root, documents_equal};
use docshift_diff::{PrettyOptions, json_merge_diff, json_merge_patch, merge_documents, render};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fn holds_object_null(doc: &Document) -> bool {
    doc.values().any(|v| match v {
        Value::Null => true,
        Value::Object(nested) => holds_object_null(nested),
        _ => false,
    })
}

fuzz_target!(|data: &[u8]| {
    // Skip overly large or small inputs
    if data.len() > 50_000 || data.len() < 4 {
        return;
    }

    // Split data into two parts for two JSON inputs
    let mid = data.len() / 2;
    let Ok(a) = serde_json::from_slice::<Value>(&data[..mid]) else {
        return;
    };
    let Ok(b) = serde_json::from_slice::<Value>(&data[mid..]) else {
        return;
    };

    // === Non-object roots must fail cleanly ===
    let (Ok(source), Ok(target)) = (as_root(&a), as_root(&b)) else {
        assert!(json_merge_diff(&a, &b).is_err());
        assert!(json_merge_patch(&a, &b).is_err());
        return;
    };
    let patch = json_merge_diff(&a, &b).expect("object roots");

    // === Contract: diff/merge roundtrip ===
    if !holds_object_null(&target) {
        let merged = merge_documents(&source, &patch);
        assert!(documents_equal(&merged, &target), "roundtrip failed: {a:?} -> {b:?}");
    }

    // === Contract: self diff is empty ===
    let self_patch = json_merge_diff(&a, &a).expect("object root");
    assert!(self_patch.is_empty(), "self diff not empty: {self_patch:?}");

    // === Contract: rendering is total ===
    let _ = render(&source, &target, &PrettyOptions::default()).expect("render");
});
