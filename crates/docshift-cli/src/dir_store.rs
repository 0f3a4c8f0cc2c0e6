// SPDX-License-Identifier: MIT OR Apache-2.0

use docshift::diff::merge_documents;
use docshift::{Document, DocumentStore, Result, ShiftError};
use docshift_core::parse_document;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Errors raised by [`DirStore`].
#[derive(Debug, Error)]
pub enum DirStoreError {
    /// The document path cannot be mapped to a file.
    #[error("invalid document path: {0:?}")]
    InvalidPath(String),

    /// No document exists at the path.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Filesystem failure.
    #[error("{path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A stored file is not a JSON object.
    #[error("{path}: {source}")]
    Corrupt {
        /// File being decoded.
        path: PathBuf,
        /// Decode failure.
        #[source]
        source: ShiftError,
    },
}

/// A [`DocumentStore`] keeping one pretty-printed JSON file per document.
///
/// Document `users/alice` lives at `<root>/users/alice.json`.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
    counter: AtomicU64,
}

impl DirStore {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_for(&self, path: &str) -> std::result::Result<PathBuf, DirStoreError> {
        let segments: Vec<&str> = path.split('/').collect();
        let valid = segments
            .iter()
            .all(|s| !s.is_empty() && *s != "." && *s != ".." && !s.contains('\\'));
        let Some((last, parents)) = segments.split_last().filter(|_| valid) else {
            return Err(DirStoreError::InvalidPath(path.to_string()));
        };
        let mut file = self.root.clone();
        file.extend(parents);
        file.push(format!("{last}.json"));
        Ok(file)
    }

    fn read(&self, path: &str) -> std::result::Result<Document, DirStoreError> {
        let file = self.file_for(path)?;
        let text = match fs::read_to_string(&file) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DirStoreError::NotFound(path.to_string()));
            }
            Err(source) => return Err(DirStoreError::Io { path: file, source }),
        };
        parse_document(&text).map_err(|source| DirStoreError::Corrupt { path: file, source })
    }

    fn write(&self, path: &str, document: &Document) -> std::result::Result<(), DirStoreError> {
        let file = self.file_for(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|source| DirStoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut text = serde_json::to_string_pretty(document).map_err(|e| DirStoreError::Corrupt {
            path: file.clone(),
            source: ShiftError::serialization(&e),
        })?;
        text.push('\n');
        debug!(file = %file.display(), "writing document");
        fs::write(&file, text).map_err(|source| DirStoreError::Io { path: file, source })
    }
}

impl DocumentStore for DirStore {
    fn name(&self) -> &str {
        "directory"
    }

    fn fetch(&self, path: &str) -> Result<Document> {
        self.read(path).map_err(ShiftError::store)
    }

    fn merge_write(&self, path: &str, patch: &Document) -> Result<()> {
        let existing = self.read(path).map_err(ShiftError::store)?;
        self.write(path, &merge_documents(&existing, patch))
            .map_err(ShiftError::store)
    }

    fn replace_write(&self, path: &str, document: &Document) -> Result<()> {
        self.write(path, document).map_err(ShiftError::store)
    }

    fn delete(&self, path: &str) -> Result<()> {
        let file = self.file_for(path).map_err(ShiftError::store)?;
        match fs::remove_file(&file) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(ShiftError::store(
                DirStoreError::Io { path: file, source: e },
            )),
            _ => Ok(()),
        }
    }

    fn new_path(&self, collection: &str) -> Result<String> {
        let collection = collection.trim_end_matches('/');
        loop {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_nanos());
            let seq = self.counter.fetch_add(1, Ordering::Relaxed);
            #[allow(clippy::cast_possible_truncation)]
            let candidate = format!("{collection}/{:016x}{:04x}", nanos as u64, seq & 0xffff);
            let file = self.file_for(&candidate).map_err(ShiftError::store)?;
            if !file.exists() {
                return Ok(candidate);
            }
        }
    }
}
