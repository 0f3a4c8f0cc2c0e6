// SPDX-License-Identifier: MIT OR Apache-2.0

use docshift_core::{Document, Result, Value, as_root, parse_document};

/// Apply an RFC 7386 merge patch to `base`, returning the merged document.
///
/// `base` may be `null`, which merges into the empty document.
///
/// # Errors
///
/// Returns [`docshift_core::ShiftError::InvalidRoot`] if either operand is an
/// array or scalar.
pub fn json_merge_patch(base: &Value, patch: &Value) -> Result<Document> {
    let base = as_root(base)?;
    let patch = as_root(patch)?;
    Ok(merge_documents(&base, &patch))
}

/// Apply a merge patch given as JSON text.
///
/// # Errors
///
/// Returns [`docshift_core::ShiftError::Parse`] if the instruction is not valid
/// JSON and [`docshift_core::ShiftError::InvalidRoot`] if it is not an object.
/// `base` is never touched on failure.
pub fn apply_instruction(base: &Document, instruction: &str) -> Result<Document> {
    let patch = parse_document(instruction)?;
    Ok(merge_documents(base, &patch))
}

/// Apply merge patch `patch` to a copy of `base`.
#[must_use]
pub fn merge_documents(base: &Document, patch: &Document) -> Document {
    let mut result = base.clone();
    merge_into(&mut result, patch);
    result
}

/// Apply `patches` to `base` in order.
#[must_use]
pub fn merge_many<'a>(base: &Document, patches: impl IntoIterator<Item = &'a Document>) -> Document {
    let mut result = base.clone();
    for patch in patches {
        merge_into(&mut result, patch);
    }
    result
}

fn merge_into(target: &mut Document, patch: &Document) {
    for (key, value) in patch {
        match value {
            Value::Null => {
                target.remove(key);
            }
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Document::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Document::new());
                }
                if let Value::Object(existing) = slot {
                    merge_into(existing, nested);
                }
            }
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}
