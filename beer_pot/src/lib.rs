//! # Beer Pot
//!
//! A running-tab ledger for exactly two participants who share a communal pot.
//!
//! Three kinds of events are tracked:
//!
//! - **Bet**: every participant who was wrong pays the stake into the pot
//! - **Purchase**: money leaves the pot, fronted by one participant
//! - **Transfer**: equity moves between the participants, the pot is untouched
//!
//! The pot balance is cached but always recomputable from the history. The
//! per-person totals are never stored; they are folded from the full history
//! on every request.
//!
//! ## Core Modules
//!
//! - [`money`]: cent-precision decimal arithmetic
//! - [`ledger`]: transaction model, the [`Pot`] algorithms and the shared [`PotManager`]
//! - [`store`]: JSON file and PostgreSQL persistence behind one trait
//! - [`interchange`]: lossless CSV export/import
//!
//! ## Example
//!
//! ```
//! use beer_pot::{Money, Participants, Pot, Side};
//!
//! let mut pot = Pot::new(Participants::default());
//! pot.record_bet(false, true, "", Money::from_cents(500)).unwrap();
//! pot.record_purchase(Money::from_cents(300), Side::First, "Feierabendbier").unwrap();
//!
//! assert_eq!(pot.balance(), Money::from_cents(200));
//! assert_eq!(pot.person_totals().get(Side::First), Money::from_cents(200));
//! ```

pub mod clock;
pub mod interchange;
pub mod ledger;
pub mod money;
pub mod store;
pub mod view;

pub use clock::{LEDGER_TZ, Timestamp};
pub use ledger::{
    BetOutcome, Entry, LedgerError, LedgerResult, Participants, PersonTotals, Pot, PotError,
    PotManager, PotResult, Receipt, Settlement, Side, Transaction, TransactionEdit,
    TransactionKind,
};
pub use money::Money;
pub use view::HistoryRow;
