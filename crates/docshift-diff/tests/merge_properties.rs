// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tests for the merge-diff and merge-patch engines.

use docshift_core::{Document, Value, documents_equal, values_equal};
use docshift_diff::{PrettyOptions, diff_documents, merge_documents, render};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1000.0f64..1000.0).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

// Objects never hold `null` values: a merge patch reads them as deletions.
fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(prop_oneof![inner.clone(), Just(Value::Null)], 0..4)
                .prop_map(Value::Array),
            prop::collection::btree_map("[a-e]", inner, 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::btree_map("[a-f]", value(), 0..6).prop_map(|m| m.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_diff_then_merge_roundtrips(a in document(), b in document()) {
        let patch = diff_documents(&a, &b);
        let merged = merge_documents(&a, &patch);
        prop_assert!(documents_equal(&merged, &b), "merged={merged:?} target={b:?} patch={patch:?}");
    }

    #[test]
    fn prop_diff_is_minimal(a in document(), b in document()) {
        let patch = diff_documents(&a, &b);
        for key in patch.keys() {
            if let (Some(old), Some(new)) = (a.get(key), b.get(key)) {
                prop_assert!(!values_equal(old, new), "unchanged key {key} in patch");
            }
        }
    }

    #[test]
    fn prop_self_diff_is_empty(a in document()) {
        prop_assert!(diff_documents(&a, &a).is_empty());
    }

    #[test]
    fn prop_empty_patch_is_identity(a in document()) {
        prop_assert_eq!(merge_documents(&a, &Document::new()), a);
    }

    #[test]
    fn prop_render_empty_iff_equal(a in document(), b in document()) {
        let out = render(&a, &b, &PrettyOptions::default()).unwrap();
        prop_assert_eq!(out.is_empty(), documents_equal(&a, &b));
    }
}
