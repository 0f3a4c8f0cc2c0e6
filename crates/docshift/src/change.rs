// SPDX-License-Identifier: MIT OR Apache-2.0
//! A proposed change to one document and its resolution.
//!
//! A [`Change`] starts out holding the caller's inputs: the document's last
//! known state, a patch document or a merge-patch instruction, and an optional
//! explicit [`Command`]. [`Change::resolve`] runs four steps in a fixed order,
//! stopping at the first failure:
//!
//! 1. infer the after-state,
//! 2. infer the command when it was not given,
//! 3. render the review diff,
//! 4. compute the rollback patch.
//!
//! Resolution happens once. A failed change keeps its error and exposes none
//! of the derived fields; build a new change to try again.

use crate::store::DocumentStore;
use docshift_core::{Command, Document, Result, ShiftError, parse_document, to_canonical_string};
use docshift_diff::{PrettyOptions, diff_documents, merge_documents, render};
use std::borrow::Cow;
use std::io::{self, Write};
use tracing::{debug, info, instrument, trace, warn};

static NOT_RESOLVED: ShiftError = ShiftError::NotResolved;

/// Everything a successful resolution derives.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The command, inferred if it was unknown on input
    pub command: Command,
    /// The patch actually applied: the patch document or the parsed instruction
    pub patch: Document,
    /// The document after the change
    pub after: Document,
    /// Review rendering of before versus after
    pub pretty_diff: String,
    /// Canonical merge patch that restores the before-state
    pub rollback: String,
}

#[derive(Debug, Clone)]
enum State {
    Unresolved,
    Resolved(Resolution),
    Failed(ShiftError),
}

/// A proposed change to a single document.
#[derive(Debug, Clone)]
pub struct Change {
    doc_path: String,
    before: Option<Document>,
    patch: Option<Document>,
    instruction: String,
    command: Command,
    pretty_options: PrettyOptions,
    state: State,
}

impl Change {
    /// Create an unresolved change.
    ///
    /// `patch` and `instruction` are alternatives; when both are supplied the
    /// patch document is used.
    pub fn new(
        doc_path: impl Into<String>,
        before: Option<Document>,
        patch: Option<Document>,
        command: Command,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            doc_path: doc_path.into(),
            before,
            patch,
            instruction: instruction.into(),
            command,
            pretty_options: PrettyOptions::default(),
            state: State::Unresolved,
        }
    }

    /// Change driven by a patch document.
    pub fn from_patch(
        doc_path: impl Into<String>,
        before: Option<Document>,
        patch: Document,
        command: Command,
    ) -> Self {
        Self::new(doc_path, before, Some(patch), command, String::new())
    }

    /// Change driven by a merge-patch instruction.
    pub fn from_instruction(
        doc_path: impl Into<String>,
        before: Option<Document>,
        instruction: impl Into<String>,
        command: Command,
    ) -> Self {
        Self::new(doc_path, before, None, command, instruction)
    }

    /// Change that deletes the document.
    pub fn delete(doc_path: impl Into<String>, before: Document) -> Self {
        Self::new(doc_path, Some(before), None, Command::Delete, String::new())
    }

    /// Use `options` when rendering the review diff.
    #[must_use]
    pub fn with_pretty_options(mut self, options: PrettyOptions) -> Self {
        self.pretty_options = options;
        self
    }

    /// Path of the target document.
    #[must_use]
    pub fn doc_path(&self) -> &str {
        &self.doc_path
    }

    /// Last known state of the document.
    #[must_use]
    pub const fn before(&self) -> Option<&Document> {
        self.before.as_ref()
    }

    /// Patch document supplied by the caller.
    #[must_use]
    pub const fn patch(&self) -> Option<&Document> {
        self.patch.as_ref()
    }

    /// Instruction text supplied by the caller.
    #[must_use]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// The resolved command, or the input command before resolution.
    #[must_use]
    pub const fn command(&self) -> Command {
        match &self.state {
            State::Resolved(resolution) => resolution.command,
            _ => self.command,
        }
    }

    /// The full resolution, only after a successful [`Change::resolve`].
    #[must_use]
    pub const fn resolution(&self) -> Option<&Resolution> {
        match &self.state {
            State::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    /// Document state after the change.
    #[must_use]
    pub fn after(&self) -> Option<&Document> {
        self.resolution().map(|r| &r.after)
    }

    /// Review rendering of the change.
    #[must_use]
    pub fn pretty_diff(&self) -> Option<&str> {
        self.resolution().map(|r| r.pretty_diff.as_str())
    }

    /// Serialized merge patch that reverts the change.
    #[must_use]
    pub fn rollback(&self) -> Option<&str> {
        self.resolution().map(|r| r.rollback.as_str())
    }

    /// Whether the change resolved successfully.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.state, State::Resolved(_))
    }

    /// The error blocking this change, `None` only after a successful resolve.
    #[must_use]
    pub fn error(&self) -> Option<&ShiftError> {
        match &self.state {
            State::Unresolved => Some(&NOT_RESOLVED),
            State::Resolved(_) => None,
            State::Failed(err) => Some(err),
        }
    }

    /// Resolve the change: after-state, command, review diff, rollback.
    ///
    /// # Errors
    ///
    /// Returns the first step failure, which is also kept as [`Change::error`].
    /// Returns [`ShiftError::AlreadyResolved`] without touching the state if
    /// the change was resolved before.
    #[instrument(level = "debug", skip_all, fields(doc_path = %self.doc_path, command = %self.command))]
    pub fn resolve(&mut self) -> Result<&Resolution> {
        if !matches!(self.state, State::Unresolved) {
            return Err(ShiftError::AlreadyResolved);
        }

        match self.solve() {
            Ok(resolution) => {
                debug!(command = %resolution.command, "change resolved");
                self.state = State::Resolved(resolution);
            }
            Err(err) => {
                warn!(error = %err, "change resolution failed");
                self.state = State::Failed(err.clone());
                return Err(err);
            }
        }

        self.resolution().ok_or(ShiftError::NotResolved)
    }

    fn solve(&self) -> Result<Resolution> {
        let before = self.effective_before();

        let (patch, after) = self.infer_after(before.as_deref())?;
        trace!(keys = after.len(), "after inferred");

        let command = self.infer_command(&after);
        trace!(%command, "command inferred");

        let Some(before) = before.as_deref() else {
            return Err(ShiftError::missing_input(
                "pretty diff",
                "before and after values",
            ));
        };
        let pretty_diff = render(before, &after, &self.pretty_options)?;
        trace!(lines = pretty_diff.lines().count(), "pretty diff rendered");

        let rollback = to_canonical_string(&diff_documents(&after, before))?;
        trace!(%rollback, "rollback inferred");

        Ok(Resolution {
            command,
            patch,
            after,
            pretty_diff,
            rollback,
        })
    }

    /// An add may start from nothing: treat a missing before as empty.
    fn effective_before(&self) -> Option<Cow<'_, Document>> {
        match (&self.before, self.command) {
            (Some(before), _) => Some(Cow::Borrowed(before)),
            (None, Command::Add) => Some(Cow::Owned(Document::new())),
            (None, _) => None,
        }
    }

    /// The patch document, or the parsed instruction.
    fn supplied_patch(&self) -> Result<Option<Document>> {
        if let Some(patch) = &self.patch {
            return Ok(Some(patch.clone()));
        }
        if self.instruction.is_empty() {
            return Ok(None);
        }
        parse_document(&self.instruction).map(Some)
    }

    fn infer_after(&self, before: Option<&Document>) -> Result<(Document, Document)> {
        match self.command {
            Command::Set | Command::Add => {
                let patch = self.supplied_patch()?.ok_or_else(|| {
                    ShiftError::missing_input("after", "patch or instruction for a replace")
                })?;
                let after = patch.clone();
                Ok((patch, after))
            }
            Command::Delete => Ok((self.patch.clone().unwrap_or_default(), Document::new())),
            Command::Update | Command::Unknown => {
                let missing = || ShiftError::missing_input("after", "before and patch/instruction");
                let before = before.ok_or_else(missing)?;
                let patch = self.supplied_patch()?.ok_or_else(missing)?;
                let after = merge_documents(before, &patch);
                Ok((patch, after))
            }
        }
    }

    /// Non-empty after-states become sets, empty ones deletes.
    fn infer_command(&self, after: &Document) -> Command {
        if self.command.is_known() {
            self.command
        } else if after.is_empty() {
            Command::Delete
        } else {
            Command::Set
        }
    }

    /// Write the document path and the review diff (or the error) to stdout.
    pub fn present(&self) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(err) = self.present_to(&mut handle) {
            warn!(error = %err, doc_path = %self.doc_path, "failed to present change");
        }
    }

    /// Write the document path and the review diff (or the error) to `out`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from `out`.
    pub fn present_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.doc_path)?;
        match &self.state {
            State::Resolved(resolution) if resolution.pretty_diff.is_empty() => {
                writeln!(out, "(no changes)")
            }
            State::Resolved(resolution) => write!(out, "{}", resolution.pretty_diff),
            State::Failed(err) => write_error(out, err),
            State::Unresolved => write_error(out, &NOT_RESOLVED),
        }
    }

    /// Push the resolved change to `store`.
    ///
    /// Updates are merge-written with the applied patch, sets and adds
    /// replace-write the after-state, deletes remove the document.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::NotResolved`] unless the change resolved
    /// successfully, [`ShiftError::UnknownCommand`] if no command could be
    /// determined, and otherwise whatever the store reports.
    #[instrument(level = "debug", skip_all, fields(doc_path = %self.doc_path, store = store.name()))]
    pub fn push<S: DocumentStore + ?Sized>(&self, store: &S) -> Result<()> {
        let Some(resolution) = self.resolution() else {
            warn!("refusing to push an unresolved change");
            return Err(ShiftError::NotResolved);
        };

        match resolution.command {
            Command::Update => {
                info!("merge-writing document");
                store.merge_write(&self.doc_path, &resolution.patch)
            }
            Command::Set | Command::Add => {
                info!(command = %resolution.command, "replace-writing document");
                store.replace_write(&self.doc_path, &resolution.after)
            }
            Command::Delete => {
                info!("deleting document");
                store.delete(&self.doc_path)
            }
            Command::Unknown => Err(ShiftError::UnknownCommand),
        }
    }

    /// Build the change that undoes this one.
    ///
    /// The reverse change starts from this change's after-state and applies
    /// the rollback patch with an unknown command, so it resolves to a set
    /// when the restored document has content and to a delete when it is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftError::NotResolved`] unless the change resolved
    /// successfully.
    pub fn rollback_change(&self) -> Result<Self> {
        let resolution = self.resolution().ok_or(ShiftError::NotResolved)?;
        Ok(Self::from_instruction(
            self.doc_path.clone(),
            Some(resolution.after.clone()),
            resolution.rollback.clone(),
            Command::Unknown,
        )
        .with_pretty_options(self.pretty_options.clone()))
    }
}

fn write_error<W: Write>(out: &mut W, err: &ShiftError) -> io::Result<()> {
    writeln!(out, "< ERROR STATE... cannot execute changes. >")?;
    writeln!(out, "{err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::{Value, json};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn presented(change: &Change) -> String {
        let mut buf = Vec::new();
        change.present_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_unresolved_state() {
        let change = Change::delete("test/test", doc(json!({"a": 1})));
        assert!(!change.is_resolved());
        assert!(matches!(change.error(), Some(ShiftError::NotResolved)));
        assert!(change.after().is_none());
        assert!(change.rollback().is_none());
    }

    #[test]
    fn test_resolve_once() {
        let mut change = Change::delete("test/test", doc(json!({"a": 1})));
        change.resolve().unwrap();
        assert!(change.error().is_none());
        assert!(matches!(
            change.resolve(),
            Err(ShiftError::AlreadyResolved)
        ));
        assert!(change.is_resolved());
    }

    #[test]
    fn test_missing_input_freezes_failure() {
        let mut change = Change::new("test/test", None, None, Command::Unknown, "");
        let err = change.resolve().unwrap_err();
        assert!(matches!(err, ShiftError::MissingInput { step: "after", .. }));
        assert!(matches!(
            change.error(),
            Some(ShiftError::MissingInput { step: "after", .. })
        ));
        assert!(change.pretty_diff().is_none());
        assert!(change.rollback().is_none());
        assert!(matches!(
            change.resolve(),
            Err(ShiftError::AlreadyResolved)
        ));
    }

    #[test]
    fn test_set_without_before_fails_at_pretty_diff() {
        let mut change =
            Change::from_patch("test/test", None, doc(json!({"a": 1})), Command::Set);
        let err = change.resolve().unwrap_err();
        assert!(matches!(
            err,
            ShiftError::MissingInput {
                step: "pretty diff",
                ..
            }
        ));
    }

    #[test]
    fn test_add_without_before() {
        let mut change =
            Change::from_patch("test/test", None, doc(json!({"a": "foo"})), Command::Add);
        change.resolve().unwrap();
        assert_eq!(change.rollback(), Some(r#"{"a":null}"#));
        assert_eq!(change.pretty_diff(), Some("+ a: \"foo\"\n"));
    }

    #[test]
    fn test_malformed_instruction() {
        let mut change = Change::from_instruction(
            "test/test",
            Some(doc(json!({"a": 1}))),
            "{\"a\": ",
            Command::Unknown,
        );
        assert!(matches!(change.resolve(), Err(ShiftError::Parse { .. })));
        assert_eq!(change.command(), Command::Unknown);
    }

    #[test]
    fn test_instruction_must_be_object() {
        let mut change = Change::from_instruction(
            "test/test",
            Some(doc(json!({"a": 1}))),
            "[1, 2]",
            Command::Update,
        );
        assert!(matches!(
            change.resolve(),
            Err(ShiftError::InvalidRoot { found: "array" })
        ));
    }

    #[test]
    fn test_patch_wins_over_instruction() {
        let mut change = Change::new(
            "test/test",
            Some(doc(json!({"a": 1}))),
            Some(doc(json!({"a": 2}))),
            Command::Update,
            r#"{"a": 3}"#,
        );
        let resolution = change.resolve().unwrap();
        assert_eq!(Value::Object(resolution.after.clone()), json!({"a": 2}));
    }

    #[test]
    fn test_present_resolved_and_failed() {
        let mut change = Change::from_patch(
            "users/alice",
            Some(doc(json!({"a": 1}))),
            doc(json!({"a": 2})),
            Command::Update,
        );
        change.resolve().unwrap();
        assert_eq!(presented(&change), "users/alice\n~ a: 1 -> 2\n");

        let mut failed = Change::new("users/bob", None, None, Command::Unknown, "");
        let _ = failed.resolve();
        let text = presented(&failed);
        assert!(text.starts_with("users/bob\n< ERROR STATE... cannot execute changes. >\n"));
        assert!(text.contains("missing input for after"));
    }

    #[test]
    fn test_present_no_changes() {
        let before = doc(json!({"a": 1}));
        let mut change =
            Change::from_patch("users/alice", Some(before.clone()), before, Command::Set);
        change.resolve().unwrap();
        assert_eq!(presented(&change), "users/alice\n(no changes)\n");
    }

    #[test]
    fn test_push_requires_resolution() {
        let store = MemoryStore::new();
        let change = Change::delete("users/alice", doc(json!({"a": 1})));
        assert!(matches!(change.push(&store), Err(ShiftError::NotResolved)));

        let mut failed = Change::new("users/alice", None, None, Command::Unknown, "");
        let _ = failed.resolve();
        assert!(matches!(failed.push(&store), Err(ShiftError::NotResolved)));
    }

    #[test]
    fn test_rollback_change_requires_resolution() {
        let change = Change::delete("users/alice", doc(json!({"a": 1})));
        assert!(matches!(
            change.rollback_change(),
            Err(ShiftError::NotResolved)
        ));
    }

    #[test]
    fn test_change_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Change>();
    }
}
