//! Import/export error types.

use crate::ledger::LedgerError;
use thiserror::Error;

/// CSV interchange errors.
///
/// An import that fails with any of these leaves the ledger untouched.
#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Nothing left after the comment lines
    #[error("Empty file")]
    EmptyFile,

    /// Header columns differ from the export format
    #[error("CSV header does not match the expected format (found: {})", .found.join(","))]
    HeaderMismatch { found: Vec<String> },

    /// A data row could not be turned into a transaction
    #[error("Line {line}: {source}")]
    Row {
        line: u64,
        #[source]
        source: LedgerError,
    },
}

/// Result type for import/export
pub type InterchangeResult<T> = Result<T, InterchangeError>;
