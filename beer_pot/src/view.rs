//! Display rows for the history table.

use crate::{
    clock,
    ledger::{Entry, Pot},
    money::Money,
};
use serde::Serialize;

/// One rendered history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    /// Position in the history, used to address edits and deletes
    pub index: usize,
    /// Local time, `dd.mm.yyyy HH:MM`
    pub time: String,
    pub kind_label: &'static str,
    /// Transfer amount for transfers, signed pot delta otherwise
    pub amount: Money,
    /// Losers, payer or transfer direction
    pub summary: String,
    pub comment: String,
}

impl Pot {
    /// Snapshot of the history in display form, oldest first
    pub fn history_rows(&self) -> Vec<HistoryRow> {
        let participants = self.participants();
        self.history()
            .iter()
            .enumerate()
            .map(|(index, t)| {
                let (amount, summary) = match &t.entry {
                    Entry::Bet { outcome, .. } => (
                        t.delta(),
                        format!("Verlierer → {}.", outcome.describe(participants)),
                    ),
                    Entry::Purchase { payer, .. } => (
                        t.delta(),
                        format!("Zahler → {}.", participants.name(*payer)),
                    ),
                    Entry::Transfer {
                        amount,
                        payer,
                        receiver,
                    } => (
                        *amount,
                        format!(
                            "Ausgleich → {} → {}.",
                            participants.name(*payer),
                            participants.name(*receiver)
                        ),
                    ),
                };
                HistoryRow {
                    index,
                    time: clock::display(&t.timestamp),
                    kind_label: t.kind().label(),
                    amount,
                    summary,
                    comment: t.comment.clone(),
                }
            })
            .collect()
    }

    /// `"Zuletzt zurückgesetzt: nie"` or the local reset time
    pub fn last_reset_label(&self) -> String {
        match self.last_reset() {
            Some(ts) => format!("Zuletzt zurückgesetzt: {}", clock::display(ts)),
            None => "Zuletzt zurückgesetzt: nie".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Participants, Side};

    #[test]
    fn test_rows_per_kind() {
        let mut pot = Pot::new(Participants::default());
        pot.record_bet(false, false, "Tor", Money::from_cents(500))
            .unwrap();
        pot.record_purchase(Money::from_cents(400), Side::Second, "")
            .unwrap();
        pot.record_transfer(Money::from_cents(100), Side::First, Side::Second, "")
            .unwrap();

        let rows = pot.history_rows();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].kind_label, "Wette");
        assert_eq!(rows[0].amount, Money::from_cents(1000));
        assert_eq!(rows[0].summary, "Verlierer → Sven verliert, Sevi verliert.");
        assert_eq!(rows[0].comment, "Tor");

        assert_eq!(rows[1].kind_label, "Bierkauf");
        assert_eq!(rows[1].amount, Money::from_cents(-400));
        assert_eq!(rows[1].summary, "Zahler → Sevi.");

        assert_eq!(rows[2].kind_label, "Ausgleichszahlung");
        assert_eq!(rows[2].amount, Money::from_cents(100));
        assert_eq!(rows[2].summary, "Ausgleich → Sven → Sevi.");
        assert_eq!(rows[2].index, 2);
    }

    #[test]
    fn test_last_reset_label() {
        let mut pot = Pot::new(Participants::default());
        assert_eq!(pot.last_reset_label(), "Zuletzt zurückgesetzt: nie");
        pot.reset();
        assert!(pot.last_reset_label().starts_with("Zuletzt zurückgesetzt: "));
        assert!(!pot.last_reset_label().ends_with("nie"));
    }
}
