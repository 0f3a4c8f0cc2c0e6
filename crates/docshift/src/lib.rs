// SPDX-License-Identifier: MIT OR Apache-2.0
//! # docshift
//!
//! Resolve, review, and roll back structural changes to JSON documents as part
//! of a database migration.
//!
//! A [`Change`] pairs a document's last known state with a patch document or a
//! merge-patch instruction. Resolving it derives the after-state, classifies
//! the operation ([`Command`]), renders a review diff, and computes the
//! rollback patch that restores the before-state:
//!
//! ```
//! use docshift::{Change, Command, MemoryStore, parse_document};
//!
//! let before = parse_document(r#"{"a":"foo","d":false}"#)?;
//! let mut change = Change::from_instruction(
//!     "config/app",
//!     Some(before),
//!     r#"{"a":"far","d":true,"h":1000}"#,
//!     Command::Unknown,
//! );
//! change.resolve()?;
//! assert_eq!(change.command(), Command::Set);
//! assert_eq!(change.rollback(), Some(r#"{"a":"foo","d":false,"h":null}"#));
//!
//! let store = MemoryStore::new();
//! change.push(&store)?;
//! # Ok::<(), docshift::ShiftError>(())
//! ```
//!
//! ## Crates
//!
//! - [`docshift-core`](https://docs.rs/docshift-core) - Document model, commands, errors
//! - [`docshift-diff`](https://docs.rs/docshift-diff) - Merge diff, merge patch, review rendering

#![warn(missing_docs)]

/// Change resolution
pub mod change;
/// Document store capability
pub mod store;

pub use change::{Change, Resolution};
pub use store::{DocumentStore, MemoryStore, MemoryStoreError};

/// Re-export of docshift-core for core types.
pub use docshift_core as core;
/// Re-export of docshift-diff for diff/merge functionality.
pub use docshift_diff as diff;

pub use docshift_core::{
    Command, Document, Result, ShiftError, Value, documents_equal, parse_document,
};
pub use docshift_diff::PrettyOptions;
