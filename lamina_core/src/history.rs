// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Undo/redo log.
//!
//! [`History`] is an append-only list of [`Command`]s with a cursor. Entries
//! below the cursor are applied, entries at or above it have been undone and
//! can be redone. Recording a new command discards the redo tail.
//!
//! [`History::merge`] folds a command into the previous entry when both are
//! the same kind of edit on the same layers and arrive within
//! [`HistoryConfig::merge_window`]. That turns a drag or a typing burst into
//! one undo step.
//!
//! Layers created by discarded commands (and layers removed by commands that
//! fall off the front of a capped log) are destroyed when their command
//! leaves the log, unless another entry still names them.

use alloc::vec::Vec;

use crate::command::{Command, CommandId};
use crate::document::Document;
use crate::error::CommandError;
use crate::layer::LayerId;
use crate::time::{Duration, HostTime, Timebase};

/// History tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Longest gap between two commands that still lets them merge.
    pub merge_window: Duration,
    /// Maximum number of entries kept, or `None` for no limit.
    pub capacity: Option<usize>,
}

impl HistoryConfig {
    /// Creates a config.
    #[must_use]
    pub const fn new(merge_window: Duration, capacity: Option<usize>) -> Self {
        Self {
            merge_window,
            capacity,
        }
    }

    /// Interactive editing defaults: a 500 ms merge window and 100 entries.
    #[must_use]
    pub const fn interactive(timebase: Timebase) -> Self {
        Self::new(Duration::from_millis(500, timebase), Some(100))
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::interactive(Timebase::NANOS)
    }
}

/// The command log of one document.
#[derive(Debug, Default)]
pub struct History {
    config: HistoryConfig,
    log: Vec<Command>,
    cursor: usize,
    next_id: u64,
    /// Document structure revision after the last history operation.
    revision: Option<u64>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            log: Vec::new(),
            cursor: 0,
            next_id: 0,
            revision: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    /// Applies `command` and records it as a new entry.
    ///
    /// # Errors
    ///
    /// If the command's preconditions fail, neither the document nor the log
    /// changes.
    pub fn apply(
        &mut self,
        doc: &mut Document,
        command: impl Into<Command>,
        now: HostTime,
    ) -> Result<CommandId, CommandError> {
        let mut command = command.into();
        command.apply(doc)?;
        self.truncate(doc, Some(&command));
        Ok(self.push(doc, command, now))
    }

    /// Applies `command`, folding it into the previous entry when possible.
    ///
    /// The previous entry absorbs the command if it is the one just before
    /// the cursor, is the same kind of edit on the same set of layers, and
    /// was recorded at most [`HistoryConfig::merge_window`] before `now`.
    /// Otherwise this behaves like [`apply`](Self::apply). Returns the id of
    /// the entry that now holds the edit.
    ///
    /// # Errors
    ///
    /// If the command's preconditions fail, neither the document nor the log
    /// changes.
    pub fn merge(
        &mut self,
        doc: &mut Document,
        command: impl Into<Command>,
        now: HostTime,
    ) -> Result<CommandId, CommandError> {
        let mut command = command.into();
        command.apply(doc)?;
        self.truncate(doc, Some(&command));

        if let Some(previous) = self.cursor.checked_sub(1).and_then(|i| self.log.get(i)) {
            let recent = now.saturating_duration_since(previous.time()) <= self.config.merge_window;
            if recent && previous.same_kind_and_targets(&command) {
                if let Some(mut merged) = previous.merge(&command) {
                    let id = previous.id();
                    merged.stamp(id, now);
                    log::debug!("merged {} into {id:?}", merged.description());
                    self.log[self.cursor - 1] = merged;
                    self.revision = Some(doc.structure_revision());
                    return Ok(id);
                }
            }
        }
        Ok(self.push(doc, command, now))
    }

    /// Reverts the entry before the cursor.
    ///
    /// Returns `Ok(false)` if there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Fails, leaving the cursor in place, if the document was changed
    /// outside the history so that the entry no longer reverts cleanly.
    pub fn undo(&mut self, doc: &mut Document) -> Result<bool, CommandError> {
        let Some(index) = self.cursor.checked_sub(1) else {
            return Ok(false);
        };
        self.log[index].revert(doc)?;
        self.cursor = index;
        self.revision = Some(doc.structure_revision());
        log::debug!("undid {}", self.log[index].description());
        Ok(true)
    }

    /// Re-applies the entry at the cursor.
    ///
    /// If the scene graph changed structurally outside the history since the
    /// last history operation, the redo tail is discarded first and this
    /// returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Fails, leaving the cursor in place, if the entry no longer applies.
    pub fn redo(&mut self, doc: &mut Document) -> Result<bool, CommandError> {
        if self
            .revision
            .is_some_and(|revision| revision != doc.structure_revision())
            && self.can_redo()
        {
            log::warn!(
                "document changed outside the history, dropping {} redo entries",
                self.log.len() - self.cursor
            );
            self.truncate(doc, None);
        }
        let Some(command) = self.log.get_mut(self.cursor) else {
            return Ok(false);
        };
        command.apply(doc)?;
        log::debug!("redid {}", command.description());
        self.cursor += 1;
        self.revision = Some(doc.structure_revision());
        Ok(true)
    }

    /// Returns whether there is an entry to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns whether there is an entry to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.log.len()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// Returns whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Returns the index of the most recently applied entry, or `None` when
    /// everything is undone.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.cursor.checked_sub(1)
    }

    /// Returns all entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Command] {
        &self.log
    }

    /// Describes the entry [`undo`](Self::undo) would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<&'static str> {
        self.position().map(|i| self.log[i].description())
    }

    /// Describes the entry [`redo`](Self::redo) would re-apply.
    #[must_use]
    pub fn redo_description(&self) -> Option<&'static str> {
        self.log.get(self.cursor).map(Command::description)
    }

    /// Drops every entry, destroying layers only the log could re-attach.
    pub fn clear(&mut self, doc: &mut Document) {
        let mut detached: Vec<LayerId> = self
            .log
            .drain(self.cursor..)
            .rev()
            .flat_map(|command| command.detached_when_reverted())
            .collect();
        detached.extend(
            self.log
                .drain(..)
                .rev()
                .flat_map(|command| command.detached_when_applied()),
        );
        self.release(doc, detached, None);
        self.cursor = 0;
        self.revision = None;
    }

    fn push(&mut self, doc: &mut Document, mut command: Command, now: HostTime) -> CommandId {
        self.next_id += 1;
        let id = CommandId(self.next_id);
        command.stamp(id, now);
        log::debug!("applied {} as {id:?}", command.description());
        self.log.push(command);
        self.cursor += 1;

        if let Some(capacity) = self.config.capacity {
            let excess = self.log.len().saturating_sub(capacity);
            let detached: Vec<LayerId> = self
                .log
                .drain(..excess)
                .flat_map(|command| command.detached_when_applied())
                .collect();
            self.release(doc, detached, None);
            self.cursor -= excess;
        }
        self.revision = Some(doc.structure_revision());
        id
    }

    /// Discards the redo tail, newest first.
    ///
    /// `incoming` is a command applied but not yet recorded.
    fn truncate(&mut self, doc: &mut Document, incoming: Option<&Command>) {
        let detached: Vec<LayerId> = self
            .log
            .drain(self.cursor..)
            .rev()
            .flat_map(|command| command.detached_when_reverted())
            .collect();
        self.release(doc, detached, incoming);
    }

    /// Destroys the detached layers in `candidates` that no remaining entry
    /// (nor `incoming`) refers to.
    fn release(
        &self,
        doc: &mut Document,
        candidates: Vec<LayerId>,
        incoming: Option<&Command>,
    ) {
        for layer in candidates {
            let referenced = self
                .log
                .iter()
                .chain(incoming)
                .any(|command| command.refers_to(layer));
            if referenced {
                log::trace!("keeping {layer:?}, still named by the log");
            } else {
                doc.destroy_detached(layer);
            }
        }
    }
}
