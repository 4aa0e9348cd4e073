//! Ingest error types with process exit code mapping.
//!
//! [`IngestError`] is the central error type for the loader. Each variant
//! belongs to one failure category and maps to a distinct process exit code
//! so that wrapping scripts can tell a bad input file from a failed write.

use std::path::PathBuf;

/// Coarse failure category of an [`IngestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing credential or missing expected column. Raised before any write.
    Configuration,
    /// Input file missing or malformed.
    Parse,
    /// Could not reach the document store.
    Connectivity,
    /// A document insert failed mid-run.
    Write,
}

/// Loader error enum with exit code mapping.
///
/// # Exit Codes
///
/// | Code | Category      | Variants                               |
/// |------|---------------|----------------------------------------|
/// | 2    | Configuration | `MissingCredential`, `MissingColumn`   |
/// | 3    | Parse         | `FileNotFound`, `Parse`                |
/// | 4    | Connectivity  | `Connect`, `Ping`                      |
/// | 5    | Write         | `Write`                                |
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Input file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that was opened.
        path: PathBuf,
    },

    /// Input file could not be read as delimited text.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Underlying CSV error (unequal row lengths, bad UTF-8, I/O).
        #[source]
        source: csv::Error,
    },

    /// A table lacks the join key column.
    #[error("{table} table has no `{column}` column")]
    MissingColumn {
        /// Table that was checked (`players` or `valuations`).
        table: &'static str,
        /// Expected column name.
        column: String,
    },

    /// The store credential is not configured.
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),

    /// The store client could not be constructed.
    #[error("connect error: {0}")]
    Connect(String),

    /// The administrative ping failed.
    #[error("ping failed: {0}")]
    Ping(String),

    /// A single-document insert failed; the run stops here.
    #[error("insert of document {position} (key {key}) failed: {message}")]
    Write {
        /// Zero-based position of the document in players-table order.
        position: usize,
        /// Join key of the failed document, rendered as text.
        key: String,
        /// Store-reported failure.
        message: String,
    },
}

impl IngestError {
    /// Returns the failure category for this variant.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential(_) | Self::MissingColumn { .. } => {
                ErrorCategory::Configuration
            }
            Self::FileNotFound { .. } | Self::Parse { .. } => ErrorCategory::Parse,
            Self::Connect(_) | Self::Ping(_) => ErrorCategory::Connectivity,
            Self::Write { .. } => ErrorCategory::Write,
        }
    }

    /// Returns the process exit code for this variant.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Parse => 3,
            ErrorCategory::Connectivity => 4,
            ErrorCategory::Write => 5,
        }
    }
}
