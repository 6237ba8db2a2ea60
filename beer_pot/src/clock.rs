//! Ledger time: every timestamp lives in one fixed civil timezone.

use chrono::{DateTime, NaiveDateTime, ParseResult, SecondsFormat, SubsecRound, Utc};
use chrono_tz::Tz;

/// Timezone used for storage and display
pub const LEDGER_TZ: Tz = chrono_tz::Europe::Zurich;

pub type Timestamp = DateTime<Tz>;

const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Current time at microsecond precision, the finest `TIMESTAMPTZ` keeps
pub fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6).with_timezone(&LEDGER_TZ)
}

/// Normalize any instant into the ledger timezone
pub fn normalize<Z: chrono::TimeZone>(ts: &DateTime<Z>) -> Timestamp {
    ts.with_timezone(&LEDGER_TZ)
}

/// ISO-8601 with explicit offset, e.g. `2025-06-01T18:30:00+02:00`
pub fn to_iso(ts: &Timestamp) -> String {
    ts.fixed_offset()
        .to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Parse an ISO-8601 timestamp.
///
/// Values without an offset are taken as UTC, then everything is normalized
/// into [`LEDGER_TZ`].
pub fn parse_iso(input: &str) -> ParseResult<Timestamp> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(normalize(&dt));
    }
    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(normalize(&dt));
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| normalize(&naive.and_utc()))
}

/// Short human format used in tables, e.g. `01.06.2025 18:30`
pub fn display(ts: &Timestamp) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}
