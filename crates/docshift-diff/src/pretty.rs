// SPDX-License-Identifier: MIT OR Apache-2.0

use docshift_core::{
    Document, Result, Value, documents_equal, to_canonical_string, value_to_canonical_string,
    values_equal,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Options for rendering a review diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrettyOptions {
    /// Spaces per nesting level
    pub indent: usize,
    /// Also list keys whose values did not change
    pub show_unchanged: bool,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            show_unchanged: false,
        }
    }
}

impl PrettyOptions {
    /// Set the indentation width.
    #[must_use]
    pub const fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// List unchanged keys alongside the changes.
    #[must_use]
    pub const fn show_unchanged(mut self) -> Self {
        self.show_unchanged = true;
        self
    }
}

/// Render the differences between `before` and `after`, one line per key.
///
/// Lines are prefixed `+` for additions, `-` for removals and `~` for
/// modifications; a modified nested object gets a `~ key:` header followed by
/// its own changes, indented one level deeper. Keys are sorted, so the output
/// only depends on the content of the two documents. Identical documents render
/// to the empty string.
///
/// Keys containing whitespace, control characters, `:` or `"` are printed as
/// JSON strings so every line parses back to one key.
///
/// # Errors
///
/// Returns [`docshift_core::ShiftError::Serialization`] if a value cannot be
/// encoded.
pub fn render(before: &Document, after: &Document, options: &PrettyOptions) -> Result<String> {
    let mut out = String::new();
    render_level(&mut out, before, after, 0, options)?;
    Ok(out)
}

fn render_level(
    out: &mut String,
    before: &Document,
    after: &Document,
    depth: usize,
    options: &PrettyOptions,
) -> Result<()> {
    let pad = " ".repeat(depth * options.indent);
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    for key in keys {
        let label = key_label(key)?;
        let key = key.as_str();
        match (before.get(key), after.get(key)) {
            (Some(old), None) => line(out, &pad, '-', &label, &encode(old)?),
            (None, Some(new)) => line(out, &pad, '+', &label, &encode(new)?),
            (Some(Value::Object(old)), Some(Value::Object(new))) => {
                if documents_equal(old, new) {
                    if options.show_unchanged {
                        line(out, &pad, ' ', &label, &to_canonical_string(new)?);
                    }
                } else {
                    let _ = writeln!(out, "{pad}~ {label}:");
                    render_level(out, old, new, depth + 1, options)?;
                }
            }
            (Some(old), Some(new)) => {
                if values_equal(old, new) {
                    if options.show_unchanged {
                        line(out, &pad, ' ', &label, &encode(new)?);
                    }
                } else {
                    let change = format!("{} -> {}", encode(old)?, encode(new)?);
                    line(out, &pad, '~', &label, &change);
                }
            }
            (None, None) => {}
        }
    }
    Ok(())
}

fn line(out: &mut String, pad: &str, marker: char, key: &str, text: &str) {
    let _ = writeln!(out, "{pad}{marker} {key}: {text}");
}

fn key_label(key: &str) -> Result<Cow<'_, str>> {
    let plain = !key.is_empty()
        && !key
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == ':' || c == '"');
    if plain {
        Ok(Cow::Borrowed(key))
    } else {
        encode(&Value::String(key.to_owned())).map(Cow::Owned)
    }
}

fn encode(value: &Value) -> Result<String> {
    value_to_canonical_string(value)
}
