//! Persistence layer: document stores and the insert sink.
//!
//! Provides the [`DocumentStore`] trait for single-document writes to a
//! document database, a MongoDB implementation, an in-memory
//! implementation for dry runs, and the [`Sink`] that drives a store
//! through one load.

use std::future::Future;

use crate::domain::MergedDocument;
use crate::error::IngestError;

pub mod memory;
pub mod mongo;
pub mod sink;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use sink::{PingPolicy, Sink, SinkState, load_documents};

/// A connected document store that accepts one document at a time.
pub trait DocumentStore: Send {
    /// Issues a lightweight administrative round-trip.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Ping`] if the store does not answer.
    fn ping(&self) -> impl Future<Output = Result<(), IngestError>> + Send;

    /// Inserts a single document. The store assigns its own identity.
    ///
    /// # Errors
    ///
    /// Returns an error message describing the store failure; the sink
    /// wraps it into [`IngestError::Write`].
    fn insert_one(
        &self,
        document: &MergedDocument,
    ) -> impl Future<Output = Result<(), String>> + Send;

    /// Releases the connection. Called exactly once per store.
    fn close(self) -> impl Future<Output = ()> + Send;
}
