//! MongoDB implementation of the document store.

use mongodb::bson::{Document, doc};
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection};

use super::DocumentStore;
use crate::config::StoreConfig;
use crate::domain::MergedDocument;
use crate::error::IngestError;

/// MongoDB-backed store writing into one fixed database/collection pair.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoStore {
    /// Builds a client for the configured cluster using Stable API v1.
    ///
    /// Resolving the SRV record and parsing the URI happen here; no
    /// server round-trip is made until [`DocumentStore::ping`].
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Connect`] if the connection string cannot be
    /// parsed or resolved.
    pub async fn connect(config: &StoreConfig) -> Result<Self, IngestError> {
        let mut options = ClientOptions::parse(config.connection_string())
            .await
            .map_err(|e| IngestError::Connect(e.to_string()))?;
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

        let client =
            Client::with_options(options).map_err(|e| IngestError::Connect(e.to_string()))?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        tracing::info!(
            host = %config.cluster_host,
            database = %config.database,
            collection = %config.collection,
            "document store client created"
        );
        Ok(Self { client, collection })
    }
}

impl DocumentStore for MongoStore {
    async fn ping(&self) -> Result<(), IngestError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| IngestError::Ping(e.to_string()))
    }

    async fn insert_one(&self, document: &MergedDocument) -> Result<(), String> {
        self.collection
            .insert_one(document.to_document())
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn close(self) {
        self.client.shutdown().await;
    }
}
