// SPDX-License-Identifier: MIT OR Apache-2.0
//! The document store capability a resolved change is pushed to.

use docshift_core::{Document, Result, ShiftError};
use docshift_diff::merge_documents;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// A document collection that changes are read from and written to.
///
/// Implementations report their own failures through [`ShiftError::store`];
/// callers receive them unchanged.
pub trait DocumentStore {
    /// Human-readable name of the backing store.
    fn name(&self) -> &str;

    /// Read the current state of the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the document cannot be read.
    fn fetch(&self, path: &str) -> Result<Document>;

    /// Merge `patch` into the stored document (update semantics).
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails.
    fn merge_write(&self, path: &str, patch: &Document) -> Result<()>;

    /// Replace or create the document at `path` with `document`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the write fails.
    fn replace_write(&self, path: &str, document: &Document) -> Result<()>;

    /// Remove the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns a store error if the delete fails.
    fn delete(&self, path: &str) -> Result<()>;

    /// Generate a fresh document path under `collection`.
    ///
    /// # Errors
    ///
    /// Returns a store error if no path can be generated.
    fn new_path(&self, collection: &str) -> Result<String>;
}

/// Errors raised by [`MemoryStore`].
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// No document exists at the path.
    #[error("document not found: {0}")]
    NotFound(String),
}

/// An in-memory [`DocumentStore`] keyed by document path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, Document>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `documents`.
    #[must_use]
    pub fn with_documents(documents: impl IntoIterator<Item = (String, Document)>) -> Self {
        Self {
            documents: RwLock::new(documents.into_iter().collect()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Snapshot of the document at `path`, if present.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Document> {
        self.documents.read().get(path).cloned()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(&self, path: &str) -> Result<Document> {
        let document = self.documents.read().get(path).cloned();
        document.ok_or_else(|| ShiftError::store(MemoryStoreError::NotFound(path.to_string())))
    }

    fn merge_write(&self, path: &str, patch: &Document) -> Result<()> {
        let mut documents = self.documents.write();
        let existing = documents
            .get_mut(path)
            .ok_or_else(|| ShiftError::store(MemoryStoreError::NotFound(path.to_string())))?;
        *existing = merge_documents(existing, patch);
        Ok(())
    }

    fn replace_write(&self, path: &str, document: &Document) -> Result<()> {
        let mut documents = self.documents.write();
        documents.insert(path.to_string(), document.clone());
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let mut documents = self.documents.write();
        documents.remove(path);
        Ok(())
    }

    fn new_path(&self, collection: &str) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(format!("{}/{id:020}", collection.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_replace_then_fetch() {
        let store = MemoryStore::new();
        store
            .replace_write("users/alice", &doc(json!({"age": 30})))
            .unwrap();
        assert_eq!(
            Value::Object(store.fetch("users/alice").unwrap()),
            json!({"age": 30})
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_merge_write() {
        let store = MemoryStore::with_documents([(
            "users/alice".to_string(),
            doc(json!({"age": 30, "tags": ["a"], "old": true})),
        )]);
        store
            .merge_write("users/alice", &doc(json!({"age": 31, "old": null})))
            .unwrap();
        assert_eq!(
            Value::Object(store.get("users/alice").unwrap()),
            json!({"age": 31, "tags": ["a"]})
        );
    }

    #[test]
    fn test_merge_write_missing_document() {
        let store = MemoryStore::new();
        let err = store
            .merge_write("users/bob", &doc(json!({"a": 1})))
            .unwrap_err();
        assert!(err.is_store());
        assert_eq!(err.to_string(), "document not found: users/bob");
    }

    #[test]
    fn test_fetch_missing_document() {
        let store = MemoryStore::new();
        assert!(store.fetch("nope").unwrap_err().is_store());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryStore::with_documents([("a/b".to_string(), Document::new())]);
        store.delete("a/b").unwrap();
        store.delete("a/b").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_shared_between_threads() {
        let store = MemoryStore::new();
        std::thread::scope(|scope| {
            for i in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    let path = store.new_path("jobs").unwrap();
                    store.replace_write(&path, &doc(json!({"worker": i}))).unwrap();
                });
            }
        });
        assert_eq!(store.len(), 4);
        assert!(store.get("jobs/00000000000000000000").is_some());
        assert!(store.get("jobs/missing").is_none());
    }

    #[test]
    fn test_new_path_is_unique() {
        let store = MemoryStore::new();
        let first = store.new_path("users/").unwrap();
        let second = store.new_path("users").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("users/"));
        assert_eq!(first.len(), "users/".len() + 20);
    }
}
