// SPDX-License-Identifier: MIT OR Apache-2.0
//! # JSON Merge-Diff / Merge-Patch / Review Rendering
//!
//! This crate provides three related capabilities over JSON object trees:
//!
//! ## Merge Diff
//! Compute the smallest RFC 7386 merge patch that turns one document into
//! another. Unchanged keys never appear, removed keys map to `null`, nested
//! objects are diffed recursively and arrays or scalars are replaced wholesale.
//!
//! ## Merge Patch (RFC 7386)
//! Apply a merge patch, given as a document or as JSON text:
//! - Objects are recursively merged
//! - `null` values indicate deletion
//! - Other values replace existing ones
//!
//! ## Pretty Diff
//! Render a deterministic, line-oriented summary of what changed between two
//! documents for human review.
//!
//! ## Limitations
//!
//! Recursion follows document nesting, so pathologically deep documents are
//! bounded by the call stack. An explicit `null` stored as a value inside a
//! document cannot be expressed by a merge patch, since `null` means delete.

mod diff;
mod merge;
mod pretty;

pub use diff::{diff_documents, json_merge_diff};
pub use merge::{apply_instruction, json_merge_patch, merge_documents, merge_many};
pub use pretty::{PrettyOptions, render};
