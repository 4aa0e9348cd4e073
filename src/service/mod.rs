//! Service layer: merging and load orchestration.

pub mod merge;
pub mod pipeline;

pub use merge::{MergeOutcome, ValuationGroups, group_by_key};
pub use pipeline::{LoadReport, PreparedLoad, run};
