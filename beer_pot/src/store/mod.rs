//! Persistence module.
//!
//! The ledger is saved as one whole document after every mutation, either to
//! a JSON file in the application directory or to PostgreSQL when a database
//! URL is configured. The balance is always recomputed on load, so the two
//! backends only need to agree on the record shape.

pub mod config;
pub mod errors;
pub mod json_file;
pub mod postgres;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use json_file::{DEFAULT_FILE_NAME, JsonFileStore};
pub use postgres::PgLedgerStore;
pub use repository::{LedgerStore, MemoryStore};
pub use timeouts::{DEFAULT_STORE_TIMEOUT, with_timeout};
