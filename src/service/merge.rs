//! Grouping child rows by key and nesting them under their parent rows.
//!
//! Both steps are pure. Grouping is stable (rows keep file order inside a
//! group) and total (no row with a non-null key is dropped). Merging is
//! driven by the parent table, so it yields exactly one document per parent
//! row, and child rows whose key matches no parent are never visited.

use std::collections::{HashMap, HashSet};

use crate::domain::{GroupKey, MergedDocument, Record, Table};
use crate::error::IngestError;

/// Child rows grouped by join key.
#[derive(Debug, Clone, Default)]
pub struct ValuationGroups {
    groups: HashMap<GroupKey, Vec<Record>>,
    rows: usize,
    null_keys: usize,
}

impl ValuationGroups {
    /// Number of distinct keys.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of rows placed into a group.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of rows skipped because their key cell was null.
    #[must_use]
    pub fn null_key_count(&self) -> usize {
        self.null_keys
    }
}

/// Result of nesting groups into parent rows.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// One document per parent row, in parent file order.
    pub documents: Vec<MergedDocument>,
    /// Child rows whose key matched no parent row.
    pub orphan_rows: usize,
}

/// Groups `valuations` by the `key` column.
///
/// # Errors
///
/// Returns [`IngestError::MissingColumn`] if the table header lacks `key`.
pub fn group_by_key(valuations: Table, key: &str) -> Result<ValuationGroups, IngestError> {
    require_column(&valuations, "valuations", key)?;

    let mut out = ValuationGroups::default();
    for row in valuations.into_rows() {
        match row.get(key).and_then(|v| v.group_key()) {
            Some(group_key) => {
                out.groups.entry(group_key).or_default().push(row);
                out.rows = out.rows.saturating_add(1);
            }
            None => out.null_keys = out.null_keys.saturating_add(1),
        }
    }

    tracing::debug!(
        groups = out.groups.len(),
        rows = out.rows,
        null_keys = out.null_keys,
        "valuations grouped"
    );
    Ok(out)
}

/// Nests each player's valuation group under it.
///
/// Players without a matching group (including players whose key cell is
/// null) receive an empty `valuations` array.
///
/// # Errors
///
/// Returns [`IngestError::MissingColumn`] if the players header lacks `key`.
pub fn merge(
    players: Table,
    groups: &ValuationGroups,
    key: &str,
) -> Result<MergeOutcome, IngestError> {
    require_column(&players, "players", key)?;

    let mut matched: HashSet<&GroupKey> = HashSet::new();
    let mut documents = Vec::with_capacity(players.len());

    for player in players.into_rows() {
        let found = player
            .get(key)
            .and_then(|v| v.group_key())
            .and_then(|k| groups.groups.get_key_value(&k));

        let valuations = match found {
            Some((group_key, rows)) => {
                matched.insert(group_key);
                rows.clone()
            }
            None => Vec::new(),
        };
        documents.push(MergedDocument::new(player, valuations));
    }

    let orphan_rows = groups
        .groups
        .iter()
        .filter(|(k, _)| !matched.contains(k))
        .map(|(_, rows)| rows.len())
        .sum();

    Ok(MergeOutcome {
        documents,
        orphan_rows,
    })
}

fn require_column(table: &Table, name: &'static str, key: &str) -> Result<(), IngestError> {
    if table.has_column(key) {
        Ok(())
    } else {
        Err(IngestError::MissingColumn {
            table: name,
            column: key.to_string(),
        })
    }
}
