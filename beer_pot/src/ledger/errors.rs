//! Ledger error types.

use super::models::{Receipt, TransactionKind};
use crate::{interchange::InterchangeError, money::Money, store::StoreError};
use thiserror::Error;

/// Validation errors raised by ledger operations.
///
/// None of these leave the ledger mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Amount is not positive or could not be parsed
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Pot or participant total too low
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: Money, required: Money },

    /// Transfer between a participant and themself
    #[error("Payer and receiver must be different participants")]
    SameParty,

    /// History index out of range
    #[error("No transaction at index {0}")]
    NotFound(usize),

    /// Edit does not match the stored transaction's kind
    #[error("Wrong transaction kind: stored {expected}, edit targets {found}")]
    WrongKind {
        expected: TransactionKind,
        found: TransactionKind,
    },

    /// Name is not one of the two participants
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    /// Neither participant is in the red
    #[error("Nothing to settle: no participant has a negative total")]
    NothingToSettle,

    /// Corrupt persisted or imported data
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors returned by [`PotManager`](super::PotManager)
#[derive(Debug, Error)]
pub enum PotError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Import/export error: {0}")]
    Interchange(#[from] InterchangeError),

    /// The mutation is applied in memory but could not be persisted
    #[error("{} (not saved: {source})", .receipt.message)]
    NotDurable {
        receipt: Receipt,
        #[source]
        source: StoreError,
    },
}

impl PotError {
    /// Message safe to show to a person at the screen.
    ///
    /// Database errors are replaced by a generic text so connection strings
    /// and SQL never reach the display.
    pub fn client_message(&self) -> String {
        match self {
            PotError::Store(StoreError::Database(_)) => "Datenbankfehler".to_string(),
            PotError::NotDurable {
                receipt,
                source: StoreError::Database(_),
            } => format!("{} (Warnung: nicht gespeichert, Datenbankfehler)", receipt.message),
            PotError::NotDurable { receipt, source } => {
                format!("{} (Warnung: nicht gespeichert: {source})", receipt.message)
            }
            _ => self.to_string(),
        }
    }

    /// True if in-memory state changed even though an error is reported
    pub fn is_not_durable(&self) -> bool {
        matches!(self, PotError::NotDurable { .. })
    }
}

/// Result type for [`PotManager`](super::PotManager) operations
pub type PotResult<T> = Result<T, PotError>;
