// SPDX-License-Identifier: MIT OR Apache-2.0
//! Core types, error handling, and document helpers for docshift
//!
//! This crate provides the foundational types used across the docshift workspace:
//!
//! - [`error`] - Error types and Result alias
//! - [`command`] - The operation kind a change resolves to
//! - [`document`] - The JSON document model and structural equality

#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::cargo)]

/// Operation kinds for document changes
pub mod command;
/// JSON document model helpers
pub mod document;
/// Error types for docshift operations
pub mod error;

// Re-exports for convenience
pub use command::Command;
pub use document::{
    Document, as_root, documents_equal, is_empty_document, parse_document, to_canonical_string,
    value_kind, value_to_canonical_string, values_equal,
};
pub use error::{Result, ShiftError};
pub use serde_json::Value;
