// SPDX-License-Identifier: MIT OR Apache-2.0

use docshift_core::{Document, Result, Value, as_root, values_equal};

/// Compute the merge patch that turns `source` into `target`.
///
/// Both operands must be objects; `null` stands in for the empty document.
///
/// # Errors
///
/// Returns [`docshift_core::ShiftError::InvalidRoot`] if either operand is an
/// array or scalar.
pub fn json_merge_diff(source: &Value, target: &Value) -> Result<Document> {
    let source = as_root(source)?;
    let target = as_root(target)?;
    Ok(diff_documents(&source, &target))
}

/// Compute the merge patch that turns document `source` into `target`.
///
/// Applying the result to `source` with [`crate::merge_documents`] yields
/// `target`, provided `target` stores no explicit `null` values inside objects.
#[must_use]
pub fn diff_documents(source: &Document, target: &Document) -> Document {
    let mut patch = Document::new();

    for (key, old) in source {
        match target.get(key) {
            None => {
                patch.insert(key.clone(), Value::Null);
            }
            Some(new) => {
                if let Some(change) = diff_value(old, new) {
                    patch.insert(key.clone(), change);
                }
            }
        }
    }

    for (key, new) in target {
        if !source.contains_key(key) {
            patch.insert(key.clone(), new.clone());
        }
    }

    patch
}

/// Patch entry for a key present on both sides, `None` if unchanged.
fn diff_value(old: &Value, new: &Value) -> Option<Value> {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let nested = diff_documents(old_map, new_map);
            if nested.is_empty() {
                None
            } else {
                Some(Value::Object(nested))
            }
        }
        // arrays, scalars, and type changes are replaced wholesale
        _ if values_equal(old, new) => None,
        _ => Some(new.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshift_core::ShiftError;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_identical_documents() {
        let a = doc(json!({"a": 1, "b": {"c": [1, 2]}}));
        assert!(diff_documents(&a, &a).is_empty());
    }

    #[test]
    fn test_addition_and_removal() {
        let a = doc(json!({"a": 1, "b": 2}));
        let b = doc(json!({"b": 2, "c": {"d": true}}));
        assert_eq!(
            Value::Object(diff_documents(&a, &b)),
            json!({"a": null, "c": {"d": true}})
        );
    }

    #[test]
    fn test_nested_object_diff() {
        let a = doc(json!({"e": {"f": "foo", "g": 7.8}}));
        let b = doc(json!({"e": {"f": false, "g": 7.8}}));
        assert_eq!(
            Value::Object(diff_documents(&a, &b)),
            json!({"e": {"f": false}})
        );
    }

    #[test]
    fn test_unchanged_nested_object_omitted() {
        let a = doc(json!({"e": {"f": 1}, "x": 1}));
        let b = doc(json!({"e": {"f": 1.0}, "x": 2}));
        assert_eq!(Value::Object(diff_documents(&a, &b)), json!({"x": 2}));
    }

    #[test]
    fn test_arrays_replaced_wholesale() {
        let a = doc(json!({"c": [1, 2, 3, 4]}));
        let b = doc(json!({"c": [1, 2, 6]}));
        assert_eq!(
            Value::Object(diff_documents(&a, &b)),
            json!({"c": [1, 2, 6]})
        );
    }

    #[test]
    fn test_type_changes() {
        let a = doc(json!({"x": {"y": 1}, "z": [1], "n": "1"}));
        let b = doc(json!({"x": [1], "z": {"y": 1}, "n": 1}));
        assert_eq!(
            Value::Object(diff_documents(&a, &b)),
            json!({"x": [1], "z": {"y": 1}, "n": 1})
        );
    }

    #[test]
    fn test_null_root_is_empty() {
        let patch = json_merge_diff(&Value::Null, &json!({"a": "foo"})).unwrap();
        assert_eq!(Value::Object(patch), json!({"a": "foo"}));
    }

    #[test]
    fn test_invalid_root() {
        let err = json_merge_diff(&json!([1]), &json!({})).unwrap_err();
        assert!(matches!(err, ShiftError::InvalidRoot { found: "array" }));
        let err = json_merge_diff(&json!({}), &json!("s")).unwrap_err();
        assert!(matches!(err, ShiftError::InvalidRoot { found: "string" }));
    }
}
