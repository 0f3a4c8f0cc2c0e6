// SPDX-License-Identifier: MIT OR Apache-2.0
//! The document model shared by the diff, merge, and change layers.
//!
//! Documents are `serde_json` objects. Only objects (or `null`, standing in for
//! the empty object) are valid roots for diff and merge operands.

use crate::error::{Result, ShiftError};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A JSON object: the root of every document docshift operates on.
pub type Document = Map<String, Value>;

/// Name of the JSON kind of `value`, used in error messages.
#[must_use]
pub const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Borrow `value` as a document root.
///
/// `null` yields an empty document.
///
/// # Errors
///
/// Returns [`ShiftError::InvalidRoot`] for arrays and scalars.
pub fn as_root(value: &Value) -> Result<Cow<'_, Document>> {
    match value {
        Value::Object(map) => Ok(Cow::Borrowed(map)),
        Value::Null => Ok(Cow::Owned(Document::new())),
        other => Err(ShiftError::invalid_root(value_kind(other))),
    }
}

/// Parse JSON text into a document.
///
/// # Errors
///
/// Returns [`ShiftError::Parse`] for malformed text and
/// [`ShiftError::InvalidRoot`] when the text holds an array or scalar.
pub fn parse_document(text: &str) -> Result<Document> {
    let value: Value = serde_json::from_str(text).map_err(|e| ShiftError::parse(&e))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Document::new()),
        other => Err(ShiftError::invalid_root(value_kind(&other))),
    }
}

/// Whether the document has no keys.
#[inline]
#[must_use]
pub fn is_empty_document(doc: &Document) -> bool {
    doc.is_empty()
}

/// Structural equality.
///
/// Objects compare independent of key order, arrays element-wise, and numbers
/// by numeric value (`1` equals `1.0`).
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => documents_equal(x, y),
        _ => false,
    }
}

/// Structural equality for two documents.
#[must_use]
pub fn documents_equal(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(key, left)| b.get(key).is_some_and(|right| values_equal(left, right)))
}

/// 2^64, the first float above the `u64` range.
const U64_END: f64 = 18_446_744_073_709_551_616.0;
/// -2^63, the lowest `i64`.
const I64_START: f64 = -9_223_372_036_854_775_808.0;

fn as_integer(n: &serde_json::Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison of an integer with a float; no rounding through `f64`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integer_equals_float(int: i128, float: f64) -> bool {
    float.is_finite()
        && float.fract() == 0.0
        && (I64_START..U64_END).contains(&float)
        && float as i128 == int
}

#[allow(clippy::float_cmp)]
fn numbers_equal(x: &serde_json::Number, y: &serde_json::Number) -> bool {
    match (as_integer(x), as_integer(y)) {
        (Some(l), Some(r)) => l == r,
        (Some(int), None) => y.as_f64().is_some_and(|f| integer_equals_float(int, f)),
        (None, Some(int)) => x.as_f64().is_some_and(|f| integer_equals_float(int, f)),
        (None, None) => match (x.as_f64(), y.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}

/// Encode a document as compact JSON with keys sorted at every level.
///
/// # Errors
///
/// Returns [`ShiftError::Serialization`] if encoding fails.
pub fn to_canonical_string(doc: &Document) -> Result<String> {
    serde_json::to_string(&canonicalize_map(doc)).map_err(|e| ShiftError::serialization(&e))
}

/// Encode a single value as compact JSON with sorted keys.
///
/// # Errors
///
/// Returns [`ShiftError::Serialization`] if encoding fails.
pub fn value_to_canonical_string(value: &Value) -> Result<String> {
    serde_json::to_string(&canonicalize(value)).map_err(|e| ShiftError::serialization(&e))
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(canonicalize_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

fn canonicalize_map(map: &Document) -> Document {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|key| (key.clone(), canonicalize(&map[key.as_str()])))
        .collect()
}
