//! One-shot load: read both files, nest valuations, write documents.

use std::path::Path;

use super::merge::{self, MergeOutcome};
use crate::config::IngestConfig;
use crate::domain::MergedDocument;
use crate::error::IngestError;
use crate::loader;
use crate::persistence::{DocumentStore, MemoryStore, MongoStore, PingPolicy, load_documents};

/// Counts from a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Player rows read (and documents produced).
    pub players: usize,
    /// Valuation rows read.
    pub valuations: usize,
    /// Valuation rows whose key matched no player.
    pub orphan_valuations: usize,
    /// Documents written to the store.
    pub inserted: usize,
}

/// Documents ready for the store plus the counts gathered building them.
#[derive(Debug, Clone)]
pub struct PreparedLoad {
    /// One document per player row, in players-file order.
    pub documents: Vec<MergedDocument>,
    /// Player rows read.
    pub players: usize,
    /// Valuation rows read.
    pub valuations: usize,
    /// Valuation rows never visited by the merge.
    pub orphan_valuations: usize,
}

/// Loads both files and builds the merged documents.
///
/// # Errors
///
/// Returns [`IngestError::FileNotFound`] or [`IngestError::Parse`] for bad
/// input files and [`IngestError::MissingColumn`] if either header lacks
/// `key`.
pub fn prepare(
    players_path: &Path,
    valuations_path: &Path,
    key: &str,
) -> Result<PreparedLoad, IngestError> {
    let players = loader::load_table(players_path)?;
    let valuations = loader::load_table(valuations_path)?;
    let player_rows = players.len();
    let valuation_rows = valuations.len();

    let groups = merge::group_by_key(valuations, key)?;
    let MergeOutcome {
        documents,
        orphan_rows,
    } = merge::merge(players, &groups, key)?;

    if groups.null_key_count() > 0 {
        tracing::warn!(
            rows = groups.null_key_count(),
            key,
            "valuation rows with empty key skipped"
        );
    }
    tracing::info!(
        documents = documents.len(),
        groups = groups.group_count(),
        grouped_valuations = groups.row_count(),
        orphan_valuations = orphan_rows,
        "documents merged"
    );

    Ok(PreparedLoad {
        documents,
        players: player_rows,
        valuations: valuation_rows,
        orphan_valuations: orphan_rows,
    })
}

/// Writes prepared documents into `store`, closing it afterwards.
///
/// # Errors
///
/// Propagates ping (under [`PingPolicy::Abort`]) and insert failures.
pub async fn persist(
    prepared: &PreparedLoad,
    store: impl DocumentStore,
    key: &str,
    policy: PingPolicy,
) -> Result<LoadReport, IngestError> {
    let inserted = load_documents(store, &prepared.documents, key, policy).await?;
    Ok(LoadReport {
        players: prepared.players,
        valuations: prepared.valuations,
        orphan_valuations: prepared.orphan_valuations,
        inserted,
    })
}

/// Runs the whole load described by `config`.
///
/// Input files are read and merged before the store is contacted, so a
/// bad file never opens a connection.
///
/// # Errors
///
/// Returns the first failure of any stage.
pub async fn run(config: &IngestConfig) -> Result<LoadReport, IngestError> {
    let prepared = prepare(
        &config.players_path,
        &config.valuations_path,
        &config.join_key,
    )?;

    let report = match &config.store {
        Some(store_config) => {
            let mongo = MongoStore::connect(store_config).await?;
            persist(&prepared, mongo, &config.join_key, config.ping_policy).await?
        }
        None => {
            tracing::warn!("persistence disabled, loading into memory only");
            persist(
                &prepared,
                MemoryStore::new(),
                &config.join_key,
                config.ping_policy,
            )
            .await?
        }
    };

    tracing::info!(
        players = report.players,
        valuations = report.valuations,
        orphan_valuations = report.orphan_valuations,
        inserted = report.inserted,
        "load complete"
    );
    Ok(report)
}
