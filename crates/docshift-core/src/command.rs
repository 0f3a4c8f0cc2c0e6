// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of write a change performs against a document store.
///
/// `Update` merges into the stored document, `Set` and `Add` replace it,
/// `Delete` removes it. `Unknown` marks a command still to be inferred and is
/// never dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Not yet known
    #[default]
    Unknown,
    /// Merge-patch the stored document
    Update,
    /// Replace the stored document
    Set,
    /// Create the document
    Add,
    /// Remove the document
    Delete,
}

impl Command {
    /// Lowercase name of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Update => "update",
            Self::Set => "set",
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }

    /// Whether the after-state is the patch itself rather than a merge result.
    #[must_use]
    pub const fn replaces_document(self) -> bool {
        matches!(self, Self::Set | Self::Add)
    }

    /// Whether this command can be dispatched to a store.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised command name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command name: {0}")]
pub struct ParseCommandError(String);

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" => Ok(Self::Unknown),
            "update" => Ok(Self::Update),
            "set" => Ok(Self::Set),
            "add" => Ok(Self::Add),
            "delete" => Ok(Self::Delete),
            _ => Err(ParseCommandError(s.to_string())),
        }
    }
}
