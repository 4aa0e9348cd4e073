//! In-memory document store.
//!
//! Used when persistence is disabled (a dry run that exercises the whole
//! pipeline without a network) and as the store under test. Clones share
//! the same backing collection, so a handle kept by the caller observes
//! what the sink wrote after the sink has consumed its own handle.

use std::sync::{Arc, Mutex};

use mongodb::bson::Document;

use super::DocumentStore;
use crate::domain::MergedDocument;
use crate::error::IngestError;

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<Document>,
    closed: usize,
}

/// Shared in-memory collection with optional injected failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    ping_error: Option<String>,
    fail_at: Option<usize>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every ping fail with `message`.
    #[must_use]
    pub fn with_ping_error(mut self, message: impl Into<String>) -> Self {
        self.ping_error = Some(message.into());
        self
    }

    /// Makes the insert that would become the collection's `index`-th
    /// document (zero-based) fail.
    #[must_use]
    pub fn with_write_failure_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.documents.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies out the stored documents in insertion order.
    #[must_use]
    pub fn documents(&self) -> Vec<Document> {
        self.inner
            .lock()
            .map(|g| g.documents.clone())
            .unwrap_or_default()
    }

    /// How many times a handle to this collection has been closed.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.inner.lock().map(|g| g.closed).unwrap_or(0)
    }
}

impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), IngestError> {
        match &self.ping_error {
            Some(message) => Err(IngestError::Ping(message.clone())),
            None => Ok(()),
        }
    }

    async fn insert_one(&self, document: &MergedDocument) -> Result<(), String> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| "memory store lock poisoned".to_string())?;
        if self.fail_at == Some(guard.documents.len()) {
            return Err("injected write failure".to_string());
        }
        guard.documents.push(document.to_document());
        Ok(())
    }

    async fn close(self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.closed = guard.closed.saturating_add(1);
        }
    }
}
