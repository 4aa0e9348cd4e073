//! The persisted unit: a player row with its nested valuation history.

use mongodb::bson::{Bson, Document};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::Record;

/// Field name under which child rows are nested.
pub const VALUATIONS_FIELD: &str = "valuations";

/// A parent record enriched with its grouped child records.
///
/// Rendered as the parent's columns in header order followed by a
/// `valuations` array. A parent column that is itself named `valuations` is
/// replaced by the array in place, keeping its header position. The BSON
/// and JSON renderings share this field order.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDocument {
    player: Record,
    valuations: Vec<Record>,
}

impl MergedDocument {
    /// Attaches `valuations` to `player`.
    #[must_use]
    pub fn new(player: Record, valuations: Vec<Record>) -> Self {
        Self { player, valuations }
    }

    /// The parent row.
    #[must_use]
    pub fn player(&self) -> &Record {
        &self.player
    }

    /// The nested child rows, in source file order.
    #[must_use]
    pub fn valuations(&self) -> &[Record] {
        &self.valuations
    }

    /// Renders the document for insertion into the store.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = self.player.to_document();
        let nested = self
            .valuations
            .iter()
            .map(|v| Bson::Document(v.to_document()))
            .collect();
        doc.insert(VALUATIONS_FIELD, Bson::Array(nested));
        doc
    }

    /// Renders the document as a JSON object string.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for MergedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        let mut nested = false;
        for (name, value) in self.player.iter() {
            if name == VALUATIONS_FIELD {
                map.serialize_entry(VALUATIONS_FIELD, &self.valuations)?;
                nested = true;
            } else {
                map.serialize_entry(name, value)?;
            }
        }
        if !nested {
            map.serialize_entry(VALUATIONS_FIELD, &self.valuations)?;
        }
        map.end()
    }
}
