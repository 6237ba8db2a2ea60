//! CSV interchange.
//!
//! The export format carries every field of every transaction, so an import
//! of an export reproduces the history and the reset time exactly.

pub mod csv;
pub mod errors;

pub use self::csv::{COLUMNS, ImportedLedger, export, export_file_name, export_string, import};
pub use errors::{InterchangeError, InterchangeResult};
