//! Domain layer: cell values, rows, tables, and merged documents.
//!
//! Rows carry no fixed schema. Every column declared in a file header
//! becomes an entry in an ordered [`Record`], so arbitrary player and
//! valuation fields flow through to the store untouched.

pub mod document;
pub mod record;
pub mod scalar;

pub use document::{MergedDocument, VALUATIONS_FIELD};
pub use record::{Record, Table};
pub use scalar::{GroupKey, Scalar};
