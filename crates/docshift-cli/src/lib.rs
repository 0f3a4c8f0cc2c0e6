// SPDX-License-Identifier: MIT OR Apache-2.0
//! # docshift-cli
//!
//! Command-line interface for docshift: plan, apply, and roll back changes to
//! JSON documents.
//!
//! ## Usage
//!
//! ```bash
//! # Merge patch between two documents
//! docshift diff before.json after.json
//!
//! # Apply merge patches in order
//! docshift merge base.json patch1.json patch2.json
//!
//! # Review a change without touching any store
//! docshift plan users/alice --before alice.json --instruction '{"age":31}'
//!
//! # Resolve against a directory store and push it
//! docshift apply --store ./data users/alice --patch alice-patch.json --command update
//! ```
//!
//! ## Subcommands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `diff` | Compute the RFC 7386 merge patch between two documents |
//! | `merge` | Apply merge patches to a document |
//! | `plan` | Resolve a change and print the review diff and rollback |
//! | `apply` | Resolve a change against a directory store and push it |

#![warn(missing_docs)]

/// Directory-backed document store
pub mod dir_store;
/// Tracing set-up for the CLI
pub mod logging;

pub use dir_store::{DirStore, DirStoreError};

/// Re-export of docshift for change resolution.
pub use docshift as shift;
