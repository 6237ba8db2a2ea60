//! Ledger module: the pot, its transactions and the shared service object.
//!
//! This module implements:
//! - Validated recording of bets, purchases and transfers
//! - Editing and deleting history entries with full recomputation
//! - Per-person totals folded from the history
//! - Settlement suggestions for a participant in the red
//!
//! ## Example
//!
//! ```no_run
//! use beer_pot::ledger::{Participants, PotManager, Side};
//! use beer_pot::store::JsonFileStore;
//! use beer_pot::Money;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(JsonFileStore::in_dir("./data"));
//!     let manager = PotManager::open(store, Participants::default()).await;
//!
//!     let receipt = manager
//!         .record_bet(false, true, "Elfmeter", Money::from_cents(500))
//!         .await?;
//!     println!("{}", receipt.message);
//!
//!     let totals = manager.person_totals().await;
//!     println!("Sven: {}", totals.get(Side::First).chf());
//!
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod pot;

pub use errors::{LedgerError, LedgerResult, PotError, PotResult};
pub use manager::PotManager;
pub use models::{
    BOTH_CORRECT, BetOutcome, Entry, LedgerDocument, PURCHASE_MARKER, Participants, PersonTotals,
    Receipt, Settlement, Side, Transaction, TransactionEdit, TransactionKind, TransactionRecord,
};
pub use pot::{DEFAULT_TRANSFER_COMMENT, Pot, SETTLEMENT_COMMENT};
