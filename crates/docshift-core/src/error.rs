// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for docshift operations.
pub type Result<T> = std::result::Result<T, ShiftError>;

/// Errors that can occur while diffing, merging, resolving, or pushing changes.
///
/// The enum is `Clone` so a failed resolution can keep its error around and
/// still hand a copy back to the caller.
#[derive(Debug, Clone, Error)]
pub enum ShiftError {
    /// A diff or merge operand is not a JSON object.
    #[error("invalid root: expected object, found {found}")]
    InvalidRoot {
        /// Kind of value found at the root.
        found: &'static str,
    },

    /// Instruction text did not decode to a JSON value.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        /// Decoder message.
        message: String,
        /// One-based line of the failure.
        line: usize,
        /// One-based column of the failure.
        column: usize,
    },

    /// A resolution step ran without the fields it requires.
    #[error("missing input for {step}: need {needs}")]
    MissingInput {
        /// The resolution step that failed.
        step: &'static str,
        /// What the step needed.
        needs: &'static str,
    },

    /// Error reported by a document store, passed through unchanged.
    #[error(transparent)]
    Store(Arc<dyn StdError + Send + Sync>),

    /// A value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The change has not been resolved successfully.
    #[error("change has not yet been solved")]
    NotResolved,

    /// `resolve` was called on a change that already ran.
    #[error("change was already resolved; build a new change to retry")]
    AlreadyResolved,

    /// Dispatch was attempted while the command was still unknown.
    #[error("refusing to dispatch a change with an unknown command")]
    UnknownCommand,
}

impl ShiftError {
    /// Create an invalid root error for the given value kind.
    #[inline]
    #[must_use]
    pub const fn invalid_root(found: &'static str) -> Self {
        Self::InvalidRoot { found }
    }

    /// Create a missing input error.
    #[inline]
    #[must_use]
    pub const fn missing_input(step: &'static str, needs: &'static str) -> Self {
        Self::MissingInput { step, needs }
    }

    /// Wrap a decoder failure.
    #[must_use]
    pub fn parse(err: &serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// Wrap an encoder failure.
    #[must_use]
    pub fn serialization(err: &serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Wrap an error raised by a document store.
    pub fn store(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Store(Arc::from(err.into()))
    }

    /// Whether this error came from a document store.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
