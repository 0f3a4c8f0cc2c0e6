// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tests: every resolved change can be rolled back exactly.

use docshift::diff::merge_documents;
use docshift::{Change, Command, Document, Value, parse_document};
use docshift_core::to_canonical_string;
use proptest::prelude::*;

fn value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-500i64..500).prop_map(Value::from),
        "[a-z]{0,4}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::btree_map("[a-e]", value(), 0..5).prop_map(|m| m.into_iter().collect())
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Unknown),
        Just(Command::Update),
        Just(Command::Set),
        Just(Command::Add),
        Just(Command::Delete),
    ]
}

proptest! {
    #[test]
    fn prop_rollback_restores_before(
        before in document(),
        patch in document(),
        cmd in command(),
        as_instruction in any::<bool>(),
    ) {
        let mut change = if as_instruction {
            let text = to_canonical_string(&patch).unwrap();
            Change::from_instruction("prop/doc", Some(before.clone()), text, cmd)
        } else {
            Change::from_patch("prop/doc", Some(before.clone()), patch, cmd)
        };
        let resolution = change.resolve().unwrap().clone();
        let rollback = parse_document(&resolution.rollback).unwrap();
        prop_assert_eq!(merge_documents(&resolution.after, &rollback), before);
    }

    #[test]
    fn prop_unknown_command_inference(before in document(), patch in document()) {
        let mut change = Change::from_patch("prop/doc", Some(before), patch, Command::Unknown);
        let resolution = change.resolve().unwrap();
        let expected = if resolution.after.is_empty() { Command::Delete } else { Command::Set };
        prop_assert_eq!(resolution.command, expected);
    }
}
