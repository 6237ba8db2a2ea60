//! The pot: ordered history, cached balance and the fold algorithms.
//!
//! Every mutation validates first and only then touches `history` and
//! `balance`, so a failed call leaves the pot exactly as it was.

use super::{
    errors::{LedgerError, LedgerResult},
    models::{
        BetOutcome, Entry, LedgerDocument, Participants, PersonTotals, Receipt, Settlement, Side,
        Transaction, TransactionEdit, TransactionKind,
    },
};
use crate::{
    clock::{self, Timestamp},
    money::Money,
};
use log::{debug, info, warn};

/// Comment used for transfers recorded without one
pub const DEFAULT_TRANSFER_COMMENT: &str = "Ausgleich";

/// Comment of transfers booked by [`Pot::settle`]
pub const SETTLEMENT_COMMENT: &str = "Autom. Ausgleich";

/// Sum of pot deltas. Transfers never touch the pot.
///
/// `None` if the running sum overflows.
fn fold_balance<'a>(history: impl IntoIterator<Item = &'a Transaction>) -> Option<Money> {
    history
        .into_iter()
        .try_fold(Money::ZERO, |balance, t| balance.checked_add(t.delta()))
}

/// Per-person totals folded in history order.
///
/// A bet deposit is split evenly among the losers, while a purchase is
/// attributed entirely to its payer. `None` if a total overflows.
fn fold_totals<'a>(history: impl IntoIterator<Item = &'a Transaction>) -> Option<PersonTotals> {
    let mut totals = PersonTotals::default();
    for t in history {
        match &t.entry {
            Entry::Bet { outcome, deposit } => {
                let losers = outcome.loser_count();
                if losers == 0 || !deposit.is_positive() {
                    continue;
                }
                let share = deposit.split(losers);
                for side in outcome.losers() {
                    totals.checked_add(side, share)?;
                }
            }
            Entry::Purchase { amount, payer } => totals.checked_add(*payer, -*amount)?,
            Entry::Transfer {
                amount,
                payer,
                receiver,
            } => {
                totals.checked_add(*payer, -*amount)?;
                totals.checked_add(*receiver, *amount)?;
            }
        }
    }
    Some(totals)
}

/// Balance of a history that came from storage or an import, with both folds checked.
///
/// # Errors
///
/// * `LedgerError::MalformedRecord` - A fold overflows or the balance exceeds [`Money::MAX_AMOUNT`]
fn checked_history_balance(history: &[Transaction]) -> LedgerResult<Money> {
    if fold_totals(history).is_none() {
        return Err(LedgerError::MalformedRecord(
            "person totals overflow".to_string(),
        ));
    }
    fold_balance(history)
        .filter(Money::is_within_limits)
        .ok_or_else(|| {
            LedgerError::MalformedRecord(format!("balance exceeds {}", Money::MAX_AMOUNT))
        })
}

/// Positive and storable
fn ensure_valid_amount(amount: Money) -> LedgerResult<()> {
    if amount.is_positive() && amount.is_within_limits() {
        Ok(())
    } else {
        Err(LedgerError::InvalidAmount(amount.to_string()))
    }
}

/// Stake times the number of losers, storable
fn bet_deposit(stake: Money, losers: u32) -> LedgerResult<Money> {
    ensure_valid_amount(stake)?;
    stake
        .checked_times(losers)
        .filter(Money::is_within_limits)
        .ok_or_else(|| LedgerError::InvalidAmount(stake.to_string()))
}

/// Unwrap a new balance that must stay storable
fn ensure_storable_balance(balance: Option<Money>) -> LedgerResult<Money> {
    balance
        .filter(Money::is_within_limits)
        .ok_or_else(|| LedgerError::InvalidAmount(format!("pot balance would exceed {}", Money::MAX_AMOUNT)))
}

fn ensure_covered(available: Money, required: Money) -> LedgerResult<()> {
    if required > available {
        Err(LedgerError::InsufficientFunds {
            available,
            required,
        })
    } else {
        Ok(())
    }
}

/// The shared pot of two participants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pot {
    participants: Participants,
    balance: Money,
    history: Vec<Transaction>,
    last_reset: Option<Timestamp>,
}

impl Pot {
    /// Create an empty pot that was never reset
    pub fn new(participants: Participants) -> Self {
        Self {
            participants,
            balance: Money::ZERO,
            history: Vec::new(),
            last_reset: None,
        }
    }

    /// Rebuild a pot from its persisted document.
    ///
    /// The stored balance is ignored; it is recomputed from the history.
    ///
    /// # Errors
    ///
    /// * `LedgerError::MalformedRecord` - Any record or the reset timestamp is corrupt, or the
    ///   amounts add up beyond [`Money::MAX_AMOUNT`]
    pub fn from_document(document: LedgerDocument, participants: Participants) -> LedgerResult<Self> {
        let history = document
            .history
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                record.into_transaction(&participants).map_err(|e| match e {
                    LedgerError::MalformedRecord(reason) => {
                        LedgerError::MalformedRecord(format!("entry {i}: {reason}"))
                    }
                    other => other,
                })
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        let last_reset = document
            .last_reset
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                clock::parse_iso(&value).map_err(|e| {
                    LedgerError::MalformedRecord(format!("last_reset '{value}': {e}"))
                })
            })
            .transpose()?;

        let pot = Self {
            participants,
            balance: checked_history_balance(&history)?,
            history,
            last_reset,
        };

        if document.balance.parse::<Money>().ok() != Some(pot.balance) {
            warn!(
                "Stored balance {} differs from history, using recomputed {}",
                document.balance, pot.balance
            );
        }
        Ok(pot)
    }

    /// Snapshot in the persisted shape
    pub fn to_document(&self) -> LedgerDocument {
        LedgerDocument {
            balance: self.balance.to_string(),
            history: self
                .history
                .iter()
                .map(|t| t.to_record(&self.participants))
                .collect(),
            last_reset: self.last_reset.as_ref().map(clock::to_iso),
        }
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn last_reset(&self) -> Option<&Timestamp> {
        self.last_reset.as_ref()
    }

    /// Look up one history entry
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotFound` - Index out of range
    pub fn get(&self, index: usize) -> LedgerResult<&Transaction> {
        self.history.get(index).ok_or(LedgerError::NotFound(index))
    }

    /// Record the outcome of a bet.
    ///
    /// Every wrong participant pays `stake` into the pot, so two losers
    /// deposit twice the stake. If both were right the bet is still recorded
    /// with a zero deposit.
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Stake is not positive, or the deposit
    ///   or the new balance would exceed [`Money::MAX_AMOUNT`]
    pub fn record_bet(
        &mut self,
        first_correct: bool,
        second_correct: bool,
        comment: &str,
        stake: Money,
    ) -> LedgerResult<Receipt> {
        let outcome = BetOutcome::from_correct(first_correct, second_correct);
        let deposit = bet_deposit(stake, outcome.loser_count())?;
        let balance = ensure_storable_balance(self.balance.checked_add(deposit))?;
        let losers = outcome.describe(&self.participants);

        self.history
            .push(Transaction::new(Entry::Bet { outcome, deposit }, comment));
        self.balance = balance;
        self.debug_check_balance();

        debug!("Bet recorded: {losers}, deposit {deposit}");
        Ok(self.receipt(format!(
            "Wette verbucht: {losers}. Neuer Saldo: {}",
            self.balance.chf()
        )))
    }

    /// Pay for something out of the pot.
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Amount is not positive or exceeds [`Money::MAX_AMOUNT`]
    /// * `LedgerError::InsufficientFunds` - Amount exceeds the pot balance
    pub fn record_purchase(
        &mut self,
        amount: Money,
        payer: Side,
        comment: &str,
    ) -> LedgerResult<Receipt> {
        ensure_valid_amount(amount)?;
        ensure_covered(self.balance, amount)?;

        self.history
            .push(Transaction::new(Entry::Purchase { amount, payer }, comment));
        self.balance -= amount;
        self.debug_check_balance();

        let payer = self.participants.name(payer);
        debug!("Purchase recorded: {amount} by {payer}");
        Ok(self.receipt(format!(
            "Bezahlt: {} für Bier (Zahler: {payer}). Neuer Saldo: {}",
            amount.chf(),
            self.balance.chf()
        )))
    }

    /// Move equity from `payer` to `receiver` without touching the pot.
    ///
    /// The payer can only hand over what their person total shows. An empty
    /// comment becomes [`DEFAULT_TRANSFER_COMMENT`].
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Amount is not positive or exceeds [`Money::MAX_AMOUNT`]
    /// * `LedgerError::SameParty` - Payer and receiver are the same
    /// * `LedgerError::InsufficientFunds` - Amount exceeds the payer's total
    pub fn record_transfer(
        &mut self,
        amount: Money,
        payer: Side,
        receiver: Side,
        comment: &str,
    ) -> LedgerResult<Receipt> {
        ensure_valid_amount(amount)?;
        if payer == receiver {
            return Err(LedgerError::SameParty);
        }
        let totals = fold_totals(&self.history).ok_or_else(|| {
            LedgerError::InvalidAmount("person totals overflow".to_string())
        })?;
        ensure_covered(totals.get(payer), amount)?;

        let comment = if comment.trim().is_empty() {
            DEFAULT_TRANSFER_COMMENT
        } else {
            comment
        };
        self.history.push(Transaction::new(
            Entry::Transfer {
                amount,
                payer,
                receiver,
            },
            comment,
        ));

        let (payer, receiver) = (
            self.participants.name(payer),
            self.participants.name(receiver),
        );
        debug!("Transfer recorded: {payer} -> {receiver} {amount}");
        Ok(self.receipt(format!(
            "Transfer verbucht: {payer} → {receiver} {} (Pot unverändert: {})",
            amount.chf(),
            self.balance.chf()
        )))
    }

    /// Replace the fields of an existing entry.
    ///
    /// The edit is validated like the original operation of that kind, with
    /// the edited entry's own effect removed from the pot balance or the
    /// person totals it is checked against. The timestamp is kept.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotFound` - Index out of range
    /// * `LedgerError::WrongKind` - Edit kind differs from the stored kind
    /// * any error of the matching `record_*` operation
    pub fn edit_transaction(
        &mut self,
        index: usize,
        edit: TransactionEdit,
    ) -> LedgerResult<Receipt> {
        let stored = self.get(index)?.kind();
        if stored != edit.kind() {
            return Err(LedgerError::WrongKind {
                expected: stored,
                found: edit.kind(),
            });
        }

        let rest = fold_balance(self.others(index));
        let (entry, comment, message) = match edit {
            TransactionEdit::Bet {
                first_wrong,
                second_wrong,
                stake,
                comment,
            } => {
                let outcome = BetOutcome {
                    first_wrong,
                    second_wrong,
                };
                let losers = outcome.loser_count();
                let deposit = if losers > 0 {
                    bet_deposit(stake, losers)?
                } else {
                    Money::ZERO
                };
                (
                    Entry::Bet { outcome, deposit },
                    comment,
                    "Wette aktualisiert.",
                )
            }
            TransactionEdit::Purchase {
                amount,
                payer,
                comment,
            } => {
                ensure_valid_amount(amount)?;
                let available = rest.ok_or_else(|| {
                    LedgerError::InvalidAmount("pot balance overflow".to_string())
                })?;
                ensure_covered(available, amount)?;
                (
                    Entry::Purchase { amount, payer },
                    comment,
                    "Bier-Eintrag aktualisiert.",
                )
            }
            TransactionEdit::Transfer {
                amount,
                payer,
                receiver,
                comment,
            } => {
                ensure_valid_amount(amount)?;
                if payer == receiver {
                    return Err(LedgerError::SameParty);
                }
                let totals = fold_totals(self.others(index)).ok_or_else(|| {
                    LedgerError::InvalidAmount("person totals overflow".to_string())
                })?;
                ensure_covered(totals.get(payer), amount)?;
                (
                    Entry::Transfer {
                        amount,
                        payer,
                        receiver,
                    },
                    comment,
                    "Transfer aktualisiert.",
                )
            }
        };

        let balance = ensure_storable_balance(rest.and_then(|rest| rest.checked_add(entry.delta())))?;

        let transaction = &mut self.history[index];
        transaction.entry = entry;
        transaction.comment = comment.trim().to_string();
        self.balance = balance;
        self.debug_check_balance();

        debug!("Entry {index} edited");
        Ok(self.receipt(format!(
            "{message} Neuer Saldo: {}",
            self.balance.chf()
        )))
    }

    /// Remove one entry and recompute the balance.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotFound` - Index out of range
    /// * `LedgerError::InvalidAmount` - Remaining balance would exceed [`Money::MAX_AMOUNT`]
    pub fn delete_transaction(&mut self, index: usize) -> LedgerResult<Receipt> {
        self.get(index)?;
        let balance = ensure_storable_balance(fold_balance(self.others(index)))?;
        let removed = self.history.remove(index);
        self.balance = balance;
        self.debug_check_balance();

        debug!("Entry {index} ({}) deleted", removed.kind());
        Ok(self.receipt(format!(
            "Eintrag gelöscht. Neuer Saldo: {}",
            self.balance.chf()
        )))
    }

    /// Wipe history and balance and stamp the reset time. Irreversible.
    pub fn reset(&mut self) -> Receipt {
        self.history.clear();
        self.balance = Money::ZERO;
        self.last_reset = Some(clock::now());

        info!("Pot reset");
        self.receipt("Verlauf und Saldo wurden gelöscht.".to_string())
    }

    /// Replace the whole history, e.g. after an import, and recompute the balance.
    ///
    /// # Errors
    ///
    /// * `LedgerError::MalformedRecord` - The amounts add up beyond [`Money::MAX_AMOUNT`];
    ///   the pot is left untouched
    pub fn replace_history(
        &mut self,
        history: Vec<Transaction>,
        last_reset: Option<Timestamp>,
    ) -> LedgerResult<Receipt> {
        let balance = checked_history_balance(&history)?;
        self.history = history;
        self.last_reset = last_reset;
        self.balance = balance;

        info!("History replaced with {} entries", self.history.len());
        Ok(self.receipt(format!(
            "Import abgeschlossen. Verlauf überschrieben. Neuer Saldo: {}",
            self.balance.chf()
        )))
    }

    /// Net contribution of each participant, folded over the full history
    pub fn person_totals(&self) -> PersonTotals {
        // entries are capped at MAX_AMOUNT, overflow would take trillions of them
        fold_totals(&self.history).unwrap_or_default()
    }

    /// Recompute the cached balance from the history
    ///
    /// # Errors
    ///
    /// * `LedgerError::MalformedRecord` - The amounts add up beyond [`Money::MAX_AMOUNT`]
    pub fn recalc_balance(&mut self) -> LedgerResult<Money> {
        self.balance = checked_history_balance(&self.history)?;
        Ok(self.balance)
    }

    /// Transfer that brings a negative total back towards zero, if any.
    ///
    /// Only proposed when one participant is below zero and the other above;
    /// the amount is capped by what the positive side has available.
    pub fn suggest_settlement(&self) -> Option<Settlement> {
        let totals = self.person_totals();
        Side::BOTH.into_iter().find_map(|receiver| {
            let payer = receiver.other();
            let (owed, available) = (totals.get(receiver), totals.get(payer));
            (owed.is_negative() && available.is_positive()).then(|| Settlement {
                payer,
                receiver,
                amount: available.min(-owed),
            })
        })
    }

    /// Book the suggested settlement transfer.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NothingToSettle` - No participant is in the red
    pub fn settle(&mut self) -> LedgerResult<Receipt> {
        let settlement = self
            .suggest_settlement()
            .ok_or(LedgerError::NothingToSettle)?;
        self.record_transfer(
            settlement.amount,
            settlement.payer,
            settlement.receiver,
            SETTLEMENT_COMMENT,
        )
    }

    /// Stake per loser of a stored bet, for pre-filling an edit.
    ///
    /// `None` when nobody lost.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotFound` - Index out of range
    /// * `LedgerError::WrongKind` - Entry is not a bet
    pub fn infer_stake(&self, index: usize) -> LedgerResult<Option<Money>> {
        match &self.get(index)?.entry {
            Entry::Bet { outcome, deposit } => {
                let losers = outcome.loser_count();
                Ok((losers > 0 && deposit.is_positive()).then(|| deposit.split(losers)))
            }
            other => Err(LedgerError::WrongKind {
                expected: other.kind(),
                found: TransactionKind::Bet,
            }),
        }
    }

    fn others(&self, index: usize) -> impl Iterator<Item = &Transaction> {
        self.history
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != index)
            .map(|(_, t)| t)
    }

    fn receipt(&self, message: String) -> Receipt {
        Receipt {
            message,
            balance: self.balance,
        }
    }

    fn debug_check_balance(&self) {
        debug_assert_eq!(Some(self.balance), fold_balance(&self.history));
    }
}
