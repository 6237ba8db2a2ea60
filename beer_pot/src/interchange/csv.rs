//! Lossless CSV export and import of the full history.
//!
//! Layout:
//!
//! ```text
//! # last_reset=2025-06-01T18:30:00+02:00
//! timestamp,kind,delta,losers,payer,receiver,transfer_amount,comment
//! 2025-06-02T20:15:00+02:00,BET,5.00,Sven verliert,,,0.00,Pizza
//! ```
//!
//! The `# last_reset=` line is only written when the pot was reset at least
//! once. Rows end with CRLF.

use super::errors::{InterchangeError, InterchangeResult};
use crate::{
    clock::{self, Timestamp},
    ledger::{Participants, Pot, Transaction, TransactionRecord},
};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::{info, warn};
use std::{
    collections::{BTreeSet, HashMap},
    io::{Read, Write},
};

/// Columns in export order
pub const COLUMNS: [&str; 8] = [
    "timestamp",
    "kind",
    "delta",
    "losers",
    "payer",
    "receiver",
    "transfer_amount",
    "comment",
];

const LAST_RESET_PREFIX: &str = "# last_reset=";
const BOM: char = '\u{feff}';

/// History and reset time read from a CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedLedger {
    pub history: Vec<Transaction>,
    pub last_reset: Option<Timestamp>,
}

/// Write the whole history as CSV.
///
/// # Errors
///
/// * `InterchangeError::Io` / `InterchangeError::Csv` - Writing failed
pub fn export<W: Write>(pot: &Pot, mut writer: W) -> InterchangeResult<()> {
    if let Some(last_reset) = pot.last_reset() {
        writeln!(writer, "{LAST_RESET_PREFIX}{}", clock::to_iso(last_reset))?;
    }

    let mut wrt = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(&mut writer);
    wrt.write_record(COLUMNS)?;

    for t in pot.history() {
        let r = t.to_record(pot.participants());
        wrt.write_record([
            &r.timestamp,
            &r.kind,
            &r.delta,
            &r.losers,
            &r.payer,
            &r.receiver,
            &r.transfer_amount,
            &r.comment,
        ])?;
    }
    wrt.flush()?;
    Ok(())
}

/// Export into a string
pub fn export_string(pot: &Pot) -> InterchangeResult<String> {
    let mut buf = Vec::new();
    export(pot, &mut buf)?;
    String::from_utf8(buf).map_err(|e| {
        InterchangeError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Suggested download name, e.g. `verlauf_export_20250601_183000.csv`
pub fn export_file_name(now: &Timestamp) -> String {
    format!("verlauf_export_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Parse a CSV export.
///
/// Nothing is returned unless every row parses; the caller swaps the result
/// in as a whole.
///
/// # Errors
///
/// * `InterchangeError::EmptyFile` - No header after the comment lines
/// * `InterchangeError::HeaderMismatch` - Columns differ from [`COLUMNS`]
/// * `InterchangeError::Row` - First row that is not a valid transaction
pub fn import<R: Read>(
    mut reader: R,
    participants: &Participants,
) -> InterchangeResult<ImportedLedger> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    let decoded = String::from_utf8_lossy(&raw);
    let text = decoded.strip_prefix(BOM).unwrap_or(&decoded);

    let mut last_reset = None;
    let mut skipped: u64 = 0;
    let mut body = text;
    while body.starts_with('#') {
        let (line, rest) = body.split_once('\n').unwrap_or((body, ""));
        last_reset = parse_comment(line.trim_end_matches('\r')).or(last_reset);
        body = rest;
        skipped += 1;
    }

    if body.trim().is_empty() {
        return Err(InterchangeError::EmptyFile);
    }

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let columns = column_positions(rdr.headers()?)?;

    let mut history = Vec::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line()) + skipped;
        let transaction = row_to_record(&record, &columns)
            .into_transaction(participants)
            .map_err(|source| InterchangeError::Row { line, source })?;
        history.push(transaction);
    }

    info!("Parsed {} entries from CSV", history.len());
    Ok(ImportedLedger {
        history,
        last_reset,
    })
}

/// Reset time from a `# last_reset=` line; other comments yield `None`
fn parse_comment(line: &str) -> Option<Timestamp> {
    let prefix = line.get(..LAST_RESET_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(LAST_RESET_PREFIX) {
        return None;
    }
    let value = line[LAST_RESET_PREFIX.len()..].trim();
    if value.is_empty() {
        return None;
    }
    match clock::parse_iso(value) {
        Ok(ts) => Some(ts),
        Err(e) => {
            warn!("Ignoring unparsable last_reset '{value}': {e}");
            None
        }
    }
}

fn column_positions(header: &StringRecord) -> InterchangeResult<HashMap<String, usize>> {
    let found: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
    let found_set: BTreeSet<&str> = found.iter().map(String::as_str).collect();
    let required: BTreeSet<&str> = COLUMNS.into_iter().collect();
    if found_set != required {
        return Err(InterchangeError::HeaderMismatch { found });
    }
    Ok(found
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect())
}

fn row_to_record(row: &StringRecord, columns: &HashMap<String, usize>) -> TransactionRecord {
    let field = |name: &str| {
        columns
            .get(name)
            .and_then(|&i| row.get(i))
            .unwrap_or_default()
            .to_string()
    };
    TransactionRecord {
        timestamp: field("timestamp"),
        kind: field("kind"),
        losers: field("losers"),
        comment: field("comment"),
        delta: field("delta"),
        payer: field("payer"),
        receiver: field("receiver"),
        transfer_amount: field("transfer_amount"),
    }
}
