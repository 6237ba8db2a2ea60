//! Ledger data models.

use super::errors::{LedgerError, LedgerResult};
use crate::{
    clock::{self, Timestamp},
    money::Money,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker stored for a bet where nobody was wrong
pub const BOTH_CORRECT: &str = "beide richtig";

/// Marker stored in the losers column of a purchase
pub const PURCHASE_MARKER: &str = "Bier bezahlt";

const LOSER_SUFFIX: &str = " verliert";

/// One of the two participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::First, Side::Second];

    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// Display names of the two participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    first: String,
    second: String,
}

impl Participants {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    /// Resolve a display name to a side (exact match after trimming)
    ///
    /// # Errors
    ///
    /// * `LedgerError::UnknownParticipant` - Name matches neither participant
    pub fn side_of(&self, name: &str) -> LedgerResult<Side> {
        let name = name.trim();
        Side::BOTH
            .into_iter()
            .find(|side| self.name(*side) == name)
            .ok_or_else(|| LedgerError::UnknownParticipant(name.to_string()))
    }
}

impl Default for Participants {
    fn default() -> Self {
        Self::new("Sven", "Sevi")
    }
}

/// Who was wrong in a bet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetOutcome {
    pub first_wrong: bool,
    pub second_wrong: bool,
}

impl BetOutcome {
    pub fn from_correct(first_correct: bool, second_correct: bool) -> Self {
        Self {
            first_wrong: !first_correct,
            second_wrong: !second_correct,
        }
    }

    pub fn is_wrong(&self, side: Side) -> bool {
        match side {
            Side::First => self.first_wrong,
            Side::Second => self.second_wrong,
        }
    }

    pub fn losers(&self) -> impl Iterator<Item = Side> + '_ {
        Side::BOTH.into_iter().filter(|side| self.is_wrong(*side))
    }

    pub fn loser_count(&self) -> u32 {
        self.losers().count() as u32
    }

    /// Stored text, e.g. `"Sven verliert, Sevi verliert"` or `"beide richtig"`
    pub fn describe(&self, participants: &Participants) -> String {
        let losers: Vec<String> = self
            .losers()
            .map(|side| format!("{}{LOSER_SUFFIX}", participants.name(side)))
            .collect();
        if losers.is_empty() {
            BOTH_CORRECT.to_string()
        } else {
            losers.join(", ")
        }
    }

    /// Read the stored text back into a structured outcome.
    ///
    /// # Errors
    ///
    /// * `LedgerError::MalformedRecord` - A part is neither a known loser nor the both-correct marker
    pub fn parse(text: &str, participants: &Participants) -> LedgerResult<Self> {
        let mut outcome = BetOutcome::default();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part == BOTH_CORRECT {
                continue;
            }
            let name = part.strip_suffix(LOSER_SUFFIX).ok_or_else(|| {
                LedgerError::MalformedRecord(format!("unrecognized bet outcome '{part}'"))
            })?;
            match participants.side_of(name) {
                Ok(Side::First) => outcome.first_wrong = true,
                Ok(Side::Second) => outcome.second_wrong = true,
                Err(_) => {
                    return Err(LedgerError::MalformedRecord(format!(
                        "unknown loser '{name}'"
                    )));
                }
            }
        }
        Ok(outcome)
    }
}

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "BET")]
    Bet,
    #[serde(rename = "BEER", alias = "PURCHASE")]
    Purchase,
    #[serde(rename = "TRANSFER")]
    Transfer,
}

impl TransactionKind {
    /// Code used in persisted records and CSV
    pub fn code(&self) -> &'static str {
        match self {
            TransactionKind::Bet => "BET",
            TransactionKind::Purchase => "BEER",
            TransactionKind::Transfer => "TRANSFER",
        }
    }

    /// Label shown in the history table
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Bet => "Wette",
            TransactionKind::Purchase => "Bierkauf",
            TransactionKind::Transfer => "Ausgleichszahlung",
        }
    }

    /// Parse a persisted code
    ///
    /// # Errors
    ///
    /// * `LedgerError::MalformedRecord` - Unknown kind
    pub fn from_code(code: &str) -> LedgerResult<Self> {
        match code.trim() {
            "BET" => Ok(TransactionKind::Bet),
            "BEER" | "PURCHASE" => Ok(TransactionKind::Purchase),
            "TRANSFER" => Ok(TransactionKind::Transfer),
            other => Err(LedgerError::MalformedRecord(format!(
                "unknown kind '{other}'"
            ))),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Kind-specific payload of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Money entering the pot from the wrong participants
    Bet { outcome: BetOutcome, deposit: Money },
    /// Money leaving the pot, handed over by `payer`
    Purchase { amount: Money, payer: Side },
    /// Equity moving between participants; the pot is untouched
    Transfer {
        amount: Money,
        payer: Side,
        receiver: Side,
    },
}

impl Entry {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Entry::Bet { .. } => TransactionKind::Bet,
            Entry::Purchase { .. } => TransactionKind::Purchase,
            Entry::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    /// Effect on the pot balance
    pub fn delta(&self) -> Money {
        match self {
            Entry::Bet { deposit, .. } => *deposit,
            Entry::Purchase { amount, .. } => -*amount,
            Entry::Transfer { .. } => Money::ZERO,
        }
    }
}

/// One ledger event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub timestamp: Timestamp,
    pub comment: String,
    pub entry: Entry,
}

impl Transaction {
    pub fn new(entry: Entry, comment: &str) -> Self {
        Self {
            timestamp: clock::now(),
            comment: comment.trim().to_string(),
            entry,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.entry.kind()
    }

    /// Effect on the pot balance
    pub fn delta(&self) -> Money {
        self.entry.delta()
    }

    /// Amount moved between participants, zero for non-transfers
    pub fn transfer_amount(&self) -> Money {
        match &self.entry {
            Entry::Transfer { amount, .. } => *amount,
            Entry::Bet { .. } | Entry::Purchase { .. } => Money::ZERO,
        }
    }

    /// Flatten into the persisted shape
    pub fn to_record(&self, participants: &Participants) -> TransactionRecord {
        let (losers, payer, receiver) = match &self.entry {
            Entry::Bet { outcome, .. } => (outcome.describe(participants), "", ""),
            Entry::Purchase { payer, .. } => (
                PURCHASE_MARKER.to_string(),
                participants.name(*payer),
                "",
            ),
            Entry::Transfer { payer, receiver, .. } => (
                String::new(),
                participants.name(*payer),
                participants.name(*receiver),
            ),
        };
        TransactionRecord {
            timestamp: clock::to_iso(&self.timestamp),
            kind: self.kind().code().to_string(),
            losers,
            comment: self.comment.clone(),
            delta: self.delta().to_string(),
            payer: payer.to_string(),
            receiver: receiver.to_string(),
            transfer_amount: self.transfer_amount().to_string(),
        }
    }
}

/// Flat, persisted shape of a transaction.
///
/// Fields not relevant to the kind carry `""` or `"0.00"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub timestamp: String,
    pub kind: String,
    #[serde(default)]
    pub losers: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "zero_amount")]
    pub delta: String,
    #[serde(default)]
    pub payer: String,
    #[serde(default)]
    pub receiver: String,
    #[serde(default = "zero_amount")]
    pub transfer_amount: String,
}

fn zero_amount() -> String {
    Money::ZERO.to_string()
}

fn parse_amount(field: &str, value: &str) -> LedgerResult<Money> {
    if value.trim().is_empty() {
        return Ok(Money::ZERO);
    }
    let amount: Money = value
        .parse()
        .map_err(|e| LedgerError::MalformedRecord(format!("{field} '{value}': {e}")))?;
    if !amount.is_within_limits() {
        return Err(LedgerError::MalformedRecord(format!(
            "{field} '{value}' exceeds {}",
            Money::MAX_AMOUNT
        )));
    }
    Ok(amount)
}

fn parse_side(field: &str, name: &str, participants: &Participants) -> LedgerResult<Side> {
    participants
        .side_of(name)
        .map_err(|_| LedgerError::MalformedRecord(format!("{field}: unknown participant '{name}'")))
}

impl TransactionRecord {
    /// Validate and convert into a typed transaction.
    ///
    /// An empty timestamp means "now"; timestamps without offset are UTC.
    ///
    /// # Errors
    ///
    /// * `LedgerError::MalformedRecord` - Bad timestamp, kind, amount or participant
    pub fn into_transaction(self, participants: &Participants) -> LedgerResult<Transaction> {
        let timestamp = if self.timestamp.trim().is_empty() {
            clock::now()
        } else {
            clock::parse_iso(&self.timestamp).map_err(|e| {
                LedgerError::MalformedRecord(format!("timestamp '{}': {e}", self.timestamp))
            })?
        };
        let kind = TransactionKind::from_code(&self.kind)?;
        let delta = parse_amount("delta", &self.delta)?;
        let transfer_amount = parse_amount("transfer_amount", &self.transfer_amount)?;

        let entry = match kind {
            TransactionKind::Bet => {
                if delta.is_negative() {
                    return Err(LedgerError::MalformedRecord(format!(
                        "bet with negative delta {delta}"
                    )));
                }
                Entry::Bet {
                    outcome: BetOutcome::parse(&self.losers, participants)?,
                    deposit: delta,
                }
            }
            TransactionKind::Purchase => {
                if delta.is_positive() {
                    return Err(LedgerError::MalformedRecord(format!(
                        "purchase with positive delta {delta}"
                    )));
                }
                Entry::Purchase {
                    amount: -delta,
                    payer: parse_side("payer", &self.payer, participants)?,
                }
            }
            TransactionKind::Transfer => {
                if !delta.is_zero() {
                    return Err(LedgerError::MalformedRecord(format!(
                        "transfer with non-zero delta {delta}"
                    )));
                }
                if transfer_amount.is_negative() {
                    return Err(LedgerError::MalformedRecord(format!(
                        "negative transfer_amount {transfer_amount}"
                    )));
                }
                let payer = parse_side("payer", &self.payer, participants)?;
                let receiver = parse_side("receiver", &self.receiver, participants)?;
                if payer == receiver {
                    return Err(LedgerError::MalformedRecord(
                        "transfer payer equals receiver".to_string(),
                    ));
                }
                Entry::Transfer {
                    amount: transfer_amount,
                    payer,
                    receiver,
                }
            }
        };

        Ok(Transaction {
            timestamp,
            comment: self.comment,
            entry,
        })
    }
}

/// Full persisted ledger state.
///
/// `balance` is written for readers of the raw file but ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDocument {
    #[serde(default = "zero_amount")]
    pub balance: String,
    #[serde(default)]
    pub history: Vec<TransactionRecord>,
    #[serde(default)]
    pub last_reset: Option<String>,
}

impl Default for LedgerDocument {
    fn default() -> Self {
        Self {
            balance: zero_amount(),
            history: Vec::new(),
            last_reset: None,
        }
    }
}

/// Success payload of a mutating operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub message: String,
    pub balance: Money,
}

/// Net contribution of each participant to the pot system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonTotals {
    pub first: Money,
    pub second: Money,
}

impl PersonTotals {
    pub fn get(&self, side: Side) -> Money {
        match side {
            Side::First => self.first,
            Side::Second => self.second,
        }
    }

    /// Add to one side; `None` leaves the totals unchanged on overflow
    pub(crate) fn checked_add(&mut self, side: Side, amount: Money) -> Option<()> {
        let total = match side {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        };
        *total = total.checked_add(amount)?;
        Some(())
    }

    pub fn as_tuple(&self) -> (Money, Money) {
        (self.first, self.second)
    }
}

/// Transfer proposed to bring a negative total back towards zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub payer: Side,
    pub receiver: Side,
    pub amount: Money,
}

/// Replacement fields for an existing history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEdit {
    Bet {
        first_wrong: bool,
        second_wrong: bool,
        /// Stake per loser; ignored when nobody was wrong
        stake: Money,
        comment: String,
    },
    Purchase {
        amount: Money,
        payer: Side,
        comment: String,
    },
    Transfer {
        amount: Money,
        payer: Side,
        receiver: Side,
        comment: String,
    },
}

impl TransactionEdit {
    pub fn kind(&self) -> TransactionKind {
        match self {
            TransactionEdit::Bet { .. } => TransactionKind::Bet,
            TransactionEdit::Purchase { .. } => TransactionKind::Purchase,
            TransactionEdit::Transfer { .. } => TransactionKind::Transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str) -> TransactionRecord {
        TransactionRecord {
            timestamp: "2025-06-01T18:30:00+02:00".to_string(),
            kind: kind.to_string(),
            losers: String::new(),
            comment: String::new(),
            delta: "0.00".to_string(),
            payer: String::new(),
            receiver: String::new(),
            transfer_amount: "0.00".to_string(),
        }
    }

    #[test]
    fn test_outcome_describe_and_parse() {
        let p = Participants::default();
        let both = BetOutcome::from_correct(false, false);
        assert_eq!(both.describe(&p), "Sven verliert, Sevi verliert");
        assert_eq!(BetOutcome::parse(&both.describe(&p), &p).unwrap(), both);

        let none = BetOutcome::from_correct(true, true);
        assert_eq!(none.describe(&p), BOTH_CORRECT);
        assert_eq!(BetOutcome::parse(BOTH_CORRECT, &p).unwrap(), none);
    }

    #[test]
    fn test_outcome_parse_rejects_strangers() {
        let p = Participants::default();
        assert!(BetOutcome::parse("Hans verliert", &p).is_err());
        assert!(BetOutcome::parse("irgendwas", &p).is_err());
    }

    #[test]
    fn test_comment_with_name_does_not_change_outcome() {
        let p = Participants::default();
        let mut rec = record("BET");
        rec.losers = "Sevi verliert".to_string();
        rec.delta = "5.00".to_string();
        rec.comment = "Sven verliert nie".to_string();
        let t = rec.into_transaction(&p).unwrap();
        match t.entry {
            Entry::Bet { outcome, deposit } => {
                assert!(!outcome.first_wrong);
                assert!(outcome.second_wrong);
                assert_eq!(deposit, Money::from_cents(500));
            }
            other => panic!("expected bet, got {other:?}"),
        }
    }

    #[test]
    fn test_purchase_record_roundtrip() {
        let p = Participants::default();
        let mut rec = record("BEER");
        rec.losers = PURCHASE_MARKER.to_string();
        rec.delta = "-3.00".to_string();
        rec.payer = "Sven".to_string();
        let t = rec.clone().into_transaction(&p).unwrap();
        assert_eq!(t.delta(), Money::from_cents(-300));
        assert_eq!(t.to_record(&p), rec);
    }

    #[test]
    fn test_record_amount_limits() {
        let p = Participants::default();
        let mut rec = record("BET");
        rec.losers = "Sven verliert".to_string();
        rec.delta = "9999999999999999.99".to_string();
        assert_eq!(rec.clone().into_transaction(&p).unwrap().delta(), Money::MAX_AMOUNT);

        rec.delta = "10000000000000000.00".to_string();
        assert!(matches!(
            rec.clone().into_transaction(&p),
            Err(LedgerError::MalformedRecord(_))
        ));

        rec.delta = "79228162514264337593543950335".to_string();
        assert!(matches!(
            rec.into_transaction(&p),
            Err(LedgerError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_purchase_alias_is_accepted() {
        let p = Participants::default();
        let mut rec = record("PURCHASE");
        rec.delta = "-1.00".to_string();
        rec.payer = "Sevi".to_string();
        let t = rec.into_transaction(&p).unwrap();
        assert_eq!(t.kind(), TransactionKind::Purchase);
        assert_eq!(t.to_record(&p).kind, "BEER");
    }

    #[test]
    fn test_transfer_record_rejects_nonzero_delta() {
        let p = Participants::default();
        let mut rec = record("TRANSFER");
        rec.delta = "1.00".to_string();
        rec.payer = "Sven".to_string();
        rec.receiver = "Sevi".to_string();
        assert!(matches!(
            rec.into_transaction(&p),
            Err(LedgerError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_unknown_kind_is_malformed() {
        let p = Participants::default();
        assert!(matches!(
            record("LOTTERY").into_transaction(&p),
            Err(LedgerError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_bad_decimal_is_malformed() {
        let p = Participants::default();
        let mut rec = record("BET");
        rec.delta = "fünf".to_string();
        assert!(matches!(
            rec.into_transaction(&p),
            Err(LedgerError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_missing_fields_use_sentinels() {
        let p = Participants::default();
        let rec: TransactionRecord =
            serde_json::from_str(r#"{"timestamp": "2025-06-01T18:30:00+02:00", "kind": "BET"}"#)
                .unwrap();
        let t = rec.into_transaction(&p).unwrap();
        assert_eq!(t.delta(), Money::ZERO);
        assert_eq!(t.transfer_amount(), Money::ZERO);
    }

    #[test]
    fn test_kind_serde_codes() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Purchase).unwrap(),
            "\"BEER\""
        );
        let kind: TransactionKind = serde_json::from_str("\"PURCHASE\"").unwrap();
        assert_eq!(kind, TransactionKind::Purchase);
    }
}
