//! Insert sink: drives a [`DocumentStore`] through one load.
//!
//! A sink only exists once a store is connected. From there it moves
//! strictly forward: `Connected → Inserting* → Closed`. There are no
//! retries and no reconnects; the first failed insert ends the load.

use super::DocumentStore;
use crate::domain::MergedDocument;
use crate::error::IngestError;

/// What to do when the health check ping fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingPolicy {
    /// Stop before any insert is attempted.
    Abort,
    /// Log the failure and attempt the inserts anyway.
    LogAndContinue,
}

/// Lifecycle state of a [`Sink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Store connected, nothing written yet.
    Connected,
    /// At least one insert has been attempted.
    Inserting,
    /// Store released; no further inserts are accepted.
    Closed,
}

/// Single-document insert loop over a connected store.
#[derive(Debug)]
pub struct Sink<S> {
    store: Option<S>,
    state: SinkState,
    inserted: usize,
}

impl<S: DocumentStore> Sink<S> {
    /// Wraps a connected store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store: Some(store),
            state: SinkState::Connected,
            inserted: 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SinkState {
        self.state
    }

    /// Documents successfully inserted so far.
    #[must_use]
    pub const fn inserted(&self) -> usize {
        self.inserted
    }

    /// Pings the store and applies `policy` to a failure.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Ping`] when the ping fails under
    /// [`PingPolicy::Abort`], or when the sink is already closed.
    pub async fn health_check(&self, policy: PingPolicy) -> Result<(), IngestError> {
        let Some(store) = &self.store else {
            return Err(IngestError::Ping("sink is closed".to_string()));
        };
        match store.ping().await {
            Ok(()) => {
                tracing::info!("pinged deployment, document store connection confirmed");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, ?policy, "document store ping failed");
                match policy {
                    PingPolicy::Abort => Err(err),
                    PingPolicy::LogAndContinue => Ok(()),
                }
            }
        }
    }

    /// Inserts one document.
    ///
    /// `position` is the document's index in players-table order and `key`
    /// the join column; both only label a failure.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Write`] if the store rejects the document or
    /// the sink is closed.
    pub async fn insert(
        &mut self,
        position: usize,
        document: &MergedDocument,
        key: &str,
    ) -> Result<(), IngestError> {
        let write_error = |message: String| IngestError::Write {
            position,
            key: document
                .player()
                .get(key)
                .map_or_else(|| "null".to_string(), ToString::to_string),
            message,
        };

        let Some(store) = &self.store else {
            return Err(write_error("sink is closed".to_string()));
        };
        self.state = SinkState::Inserting;
        store.insert_one(document).await.map_err(write_error)?;
        self.inserted = self.inserted.saturating_add(1);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let rendered = document.to_json().unwrap_or_default();
            tracing::debug!(position, document = %rendered, "document inserted");
        }
        Ok(())
    }

    /// Health-checks the store, then inserts every document in order.
    ///
    /// Stops at the first failed insert, leaving earlier documents in place.
    ///
    /// # Errors
    ///
    /// Propagates [`Sink::health_check`] and [`Sink::insert`] failures.
    pub async fn write_all(
        &mut self,
        documents: &[MergedDocument],
        key: &str,
        policy: PingPolicy,
    ) -> Result<usize, IngestError> {
        self.health_check(policy).await?;
        for (position, document) in documents.iter().enumerate() {
            self.insert(position, document, key).await?;
        }
        Ok(self.inserted)
    }

    /// Releases the store. Later calls are no-ops.
    pub async fn close(&mut self) {
        if let Some(store) = self.store.take() {
            store.close().await;
            tracing::debug!(inserted = self.inserted, "document store connection closed");
        }
        self.state = SinkState::Closed;
    }
}

/// Loads `documents` into `store` and always closes it afterwards.
///
/// # Errors
///
/// Returns the first health check or insert failure, after the store has
/// been closed.
pub async fn load_documents<S: DocumentStore>(
    store: S,
    documents: &[MergedDocument],
    key: &str,
    policy: PingPolicy,
) -> Result<usize, IngestError> {
    let mut sink = Sink::new(store);
    let result = sink.write_all(documents, key, policy).await;
    sink.close().await;
    result
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Record, Scalar};
    use crate::persistence::MemoryStore;

    const KEY: &str = "player_id";

    fn documents(ids: &[i64]) -> Vec<MergedDocument> {
        ids.iter()
            .map(|id| {
                let player: Record = [(KEY, Scalar::Integer(*id))].into_iter().collect();
                MergedDocument::new(player, Vec::new())
            })
            .collect()
    }

    #[tokio::test]
    async fn inserts_every_document_in_order_then_closes() {
        let store = MemoryStore::new();
        let result =
            load_documents(store.clone(), &documents(&[5, 3, 9]), KEY, PingPolicy::Abort).await;

        assert!(matches!(result, Ok(3)));
        let ids: Vec<Option<i64>> = store
            .documents()
            .iter()
            .map(|d| d.get_i64(KEY).ok())
            .collect();
        assert_eq!(ids, [Some(5), Some(3), Some(9)]);
        assert_eq!(store.close_count(), 1);
    }

    #[tokio::test]
    async fn failed_insert_aborts_and_leaves_partial_state() {
        let store = MemoryStore::new().with_write_failure_at(2);
        let result =
            load_documents(store.clone(), &documents(&[1, 2, 3, 4]), KEY, PingPolicy::Abort).await;

        let Err(IngestError::Write { position, key, .. }) = result else {
            panic!("expected write error");
        };
        assert_eq!(position, 2);
        assert_eq!(key, "3");
        assert_eq!(store.len(), 2);
        assert_eq!(store.close_count(), 1);
    }

    #[tokio::test]
    async fn ping_failure_aborts_under_abort_policy() {
        let store = MemoryStore::new().with_ping_error("no route to host");
        let result = load_documents(store.clone(), &documents(&[1]), KEY, PingPolicy::Abort).await;

        assert!(matches!(result, Err(IngestError::Ping(_))));
        assert!(store.is_empty());
        assert_eq!(store.close_count(), 1);
    }

    #[tokio::test]
    async fn ping_failure_is_logged_and_ignored_when_continuing() {
        let store = MemoryStore::new().with_ping_error("no route to host");
        let result = load_documents(
            store.clone(),
            &documents(&[1, 2]),
            KEY,
            PingPolicy::LogAndContinue,
        )
        .await;

        assert!(matches!(result, Ok(2)));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn state_moves_forward_only() {
        let mut sink = Sink::new(MemoryStore::new());
        assert_eq!(sink.state(), SinkState::Connected);

        let docs = documents(&[1]);
        let Some(doc) = docs.first() else {
            panic!("expected document");
        };
        assert!(sink.insert(0, doc, KEY).await.is_ok());
        assert_eq!(sink.state(), SinkState::Inserting);
        assert_eq!(sink.inserted(), 1);

        sink.close().await;
        assert_eq!(sink.state(), SinkState::Closed);
        assert!(matches!(
            sink.insert(1, doc, KEY).await,
            Err(IngestError::Write { .. })
        ));
        assert!(sink.health_check(PingPolicy::Abort).await.is_err());
    }

    #[tokio::test]
    async fn close_releases_store_once() {
        let store = MemoryStore::new();
        let mut sink = Sink::new(store.clone());
        sink.close().await;
        sink.close().await;
        assert_eq!(store.close_count(), 1);
    }

    #[tokio::test]
    async fn rerun_appends_duplicates() {
        let store = MemoryStore::new();
        let docs = documents(&[1, 2, 3]);

        let first = load_documents(store.clone(), &docs, KEY, PingPolicy::Abort).await;
        let second = load_documents(store.clone(), &docs, KEY, PingPolicy::Abort).await;

        assert!(matches!(first, Ok(3)));
        assert!(matches!(second, Ok(3)));
        assert_eq!(store.len(), 6);
    }
}
