// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A document shared between an edit thread and a render thread.
//!
//! Cache reads need `&mut Document`, so rendering and editing cannot overlap.
//! [`SharedDocument`] serializes them behind one coarse mutex: a frame holds
//! the lock for its whole duration, and so does each edit. A document built
//! off-thread (for example by a loader) is swapped in with
//! [`SharedDocument::install`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::document::Document;

/// A cloneable handle to a mutex-guarded [`Document`].
#[derive(Clone, Debug)]
pub struct SharedDocument {
    inner: Arc<Mutex<Document>>,
}

impl SharedDocument {
    /// Wraps a document.
    #[must_use]
    pub fn new(doc: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(doc)),
        }
    }

    /// Locks the document.
    ///
    /// A panic on another thread while it held the lock does not make the
    /// document unusable: every mutation leaves the scene graph consistent,
    /// so the guard is recovered.
    pub fn lock(&self) -> MutexGuard<'_, Document> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs an edit with exclusive access.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.lock())
    }

    /// Runs a frame (render pass) with exclusive access.
    ///
    /// Identical to [`edit`](Self::edit) in locking; kept separate so hosts
    /// can tell the two apart in their own instrumentation.
    pub fn frame<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.lock())
    }

    /// Replaces the shared document, returning the previous one.
    pub fn install(&self, replacement: Document) -> Document {
        self.lock().install(replacement)
    }
}
