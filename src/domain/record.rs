//! Ordered rows and tables.
//!
//! A [`Record`] is one row: an ordered mapping from column name to
//! [`Scalar`], in header order. A [`Table`] is the header plus every row of a
//! delimited file, in file order.

use mongodb::bson::Document;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::Scalar;

/// One row as an ordered column → value mapping.
///
/// Column order is the order of first insertion. Inserting an existing
/// column replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value`, returning the previous value if any.
    pub fn insert(&mut self, column: impl Into<String>, value: Scalar) -> Option<Scalar> {
        let column = column.into();
        if let Some((_, slot)) = self.fields.iter_mut().find(|(name, _)| *name == column) {
            return Some(std::mem::replace(slot, value));
        }
        self.fields.push((column, value));
        None
    }

    /// Returns the value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Renders the record as a BSON document, preserving column order.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (name, value) in &self.fields {
            doc.insert(name.clone(), value.to_bson());
        }
        doc
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (column, value) in iter {
            record.insert(column, value.into());
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A parsed delimited file: header columns plus rows in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Creates an empty table with the given header.
    ///
    /// Repeated header names are disambiguated by suffixing `.1`, `.2`, …
    /// to later occurrences.
    #[must_use]
    pub fn with_columns<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns: Vec<String> = Vec::new();
        for name in header {
            let base = name.as_ref();
            let mut candidate = base.to_string();
            let mut suffix = 1usize;
            while columns.contains(&candidate) {
                candidate = format!("{base}.{suffix}");
                suffix = suffix.saturating_add(1);
            }
            columns.push(candidate);
        }
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Header columns, in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns `true` if the header declares `column`.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Appends a row of already-inferred cells, zipped against the header.
    pub fn push_row<I: IntoIterator<Item = Scalar>>(&mut self, cells: I) {
        let record = self.columns.iter().cloned().zip(cells).collect();
        self.rows.push(record);
    }

    /// Rows, in file order.
    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Consumes the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
