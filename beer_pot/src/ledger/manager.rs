//! Shared pot service: one lock around the pot, held across mutate and save.

use super::{
    errors::{LedgerResult, PotError, PotResult},
    models::{Participants, PersonTotals, Receipt, Settlement, Side, TransactionEdit},
    pot::Pot,
};
use crate::{
    clock::Timestamp,
    interchange,
    money::Money,
    store::LedgerStore,
    view::HistoryRow,
};
use log::{info, warn};
use std::{io::Read, sync::Arc};
use tokio::sync::Mutex;

/// Pot manager
///
/// Cheap to clone; all clones share the same pot and store. Every mutation
/// holds the lock until the new state is saved, so concurrent callers are
/// serialized and never observe a half-applied change.
#[derive(Clone)]
pub struct PotManager {
    pot: Arc<Mutex<Pot>>,
    store: Arc<dyn LedgerStore>,
    participants: Participants,
}

impl PotManager {
    /// Load the pot from `store`.
    ///
    /// A missing, unreadable or corrupt document is logged and the pot starts
    /// empty; the next successful save overwrites it.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence backend
    /// * `participants` - Names used to resolve stored records
    ///
    /// # Returns
    ///
    /// * `PotManager` - Ready-to-use manager
    pub async fn open(store: Arc<dyn LedgerStore>, participants: Participants) -> Self {
        let pot = match store.load().await {
            Ok(Some(document)) => match Pot::from_document(document, participants.clone()) {
                Ok(pot) => {
                    info!(
                        "Loaded {} entries from {}, balance {}",
                        pot.history().len(),
                        store.describe(),
                        pot.balance()
                    );
                    pot
                }
                Err(e) => {
                    warn!("Stored ledger in {} is corrupt, starting empty: {e}", store.describe());
                    Pot::new(participants.clone())
                }
            },
            Ok(None) => {
                info!("No ledger in {}, starting empty", store.describe());
                Pot::new(participants.clone())
            }
            Err(e) => {
                warn!("Failed to load ledger from {}, starting empty: {e}", store.describe());
                Pot::new(participants.clone())
            }
        };
        Self::with_pot(pot, store)
    }

    /// Wrap an already built pot without loading anything
    pub fn with_pot(pot: Pot, store: Arc<dyn LedgerStore>) -> Self {
        let participants = pot.participants().clone();
        Self {
            pot: Arc::new(Mutex::new(pot)),
            store,
            participants,
        }
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    /// See [`Pot::record_bet`]
    pub async fn record_bet(
        &self,
        first_correct: bool,
        second_correct: bool,
        comment: &str,
        stake: Money,
    ) -> PotResult<Receipt> {
        self.mutate(|pot| pot.record_bet(first_correct, second_correct, comment, stake))
            .await
    }

    /// See [`Pot::record_purchase`]
    pub async fn record_purchase(
        &self,
        amount: Money,
        payer: Side,
        comment: &str,
    ) -> PotResult<Receipt> {
        self.mutate(|pot| pot.record_purchase(amount, payer, comment))
            .await
    }

    /// See [`Pot::record_transfer`]
    pub async fn record_transfer(
        &self,
        amount: Money,
        payer: Side,
        receiver: Side,
        comment: &str,
    ) -> PotResult<Receipt> {
        self.mutate(|pot| pot.record_transfer(amount, payer, receiver, comment))
            .await
    }

    /// See [`Pot::edit_transaction`]
    pub async fn edit_transaction(
        &self,
        index: usize,
        edit: TransactionEdit,
    ) -> PotResult<Receipt> {
        self.mutate(|pot| pot.edit_transaction(index, edit)).await
    }

    /// See [`Pot::delete_transaction`]
    pub async fn delete_transaction(&self, index: usize) -> PotResult<Receipt> {
        self.mutate(|pot| pot.delete_transaction(index)).await
    }

    /// See [`Pot::reset`]
    pub async fn reset(&self) -> PotResult<Receipt> {
        self.mutate(|pot| Ok(pot.reset())).await
    }

    /// See [`Pot::settle`]
    pub async fn settle(&self) -> PotResult<Receipt> {
        self.mutate(Pot::settle).await
    }

    /// Replace the whole history with a CSV export.
    ///
    /// The file is parsed before the lock is taken; a file that fails to
    /// parse leaves the pot untouched.
    ///
    /// # Errors
    ///
    /// * `PotError::Interchange` - File could not be parsed
    /// * `PotError::Ledger` - Amounts add up beyond [`Money::MAX_AMOUNT`]
    /// * `PotError::NotDurable` - Imported but not saved
    pub async fn import_csv<R: Read + Send>(&self, reader: R) -> PotResult<Receipt> {
        let imported = interchange::import(reader, &self.participants)?;
        self.mutate(move |pot| pot.replace_history(imported.history, imported.last_reset))
            .await
    }

    /// Full history as CSV text
    pub async fn export_csv(&self) -> PotResult<String> {
        let pot = self.pot.lock().await;
        Ok(interchange::export_string(&pot)?)
    }

    pub async fn balance(&self) -> Money {
        self.pot.lock().await.balance()
    }

    pub async fn person_totals(&self) -> PersonTotals {
        self.pot.lock().await.person_totals()
    }

    pub async fn history_rows(&self) -> Vec<HistoryRow> {
        self.pot.lock().await.history_rows()
    }

    pub async fn last_reset(&self) -> Option<Timestamp> {
        self.pot.lock().await.last_reset().cloned()
    }

    pub async fn last_reset_label(&self) -> String {
        self.pot.lock().await.last_reset_label()
    }

    pub async fn suggest_settlement(&self) -> Option<Settlement> {
        self.pot.lock().await.suggest_settlement()
    }

    /// See [`Pot::infer_stake`]
    pub async fn infer_stake(&self, index: usize) -> PotResult<Option<Money>> {
        Ok(self.pot.lock().await.infer_stake(index)?)
    }

    /// Consistent copy of the whole pot
    pub async fn snapshot(&self) -> Pot {
        self.pot.lock().await.clone()
    }

    /// Run `op` under the lock and save the result before releasing it
    async fn mutate<F>(&self, op: F) -> PotResult<Receipt>
    where
        F: FnOnce(&mut Pot) -> LedgerResult<Receipt> + Send,
    {
        let mut pot = self.pot.lock().await;
        let receipt = op(&mut *pot)?;

        match self.store.save(&pot.to_document()).await {
            Ok(()) => Ok(receipt),
            Err(source) => {
                warn!("Failed to save ledger to {}: {source}", self.store.describe());
                Err(PotError::NotDurable { receipt, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ledger::{LedgerDocument, LedgerError},
        store::{MemoryStore, StoreError, StoreResult},
    };
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl LedgerStore for BrokenStore {
        async fn load(&self) -> StoreResult<Option<LedgerDocument>> {
            Err(StoreError::Malformed("unreadable".to_string()))
        }

        async fn save(&self, _document: &LedgerDocument) -> StoreResult<()> {
            Err(StoreError::Malformed("read-only".to_string()))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[tokio::test]
    async fn test_mutation_is_saved() {
        let store = Arc::new(MemoryStore::new());
        let manager = PotManager::open(store.clone(), Participants::default()).await;
        manager
            .record_bet(false, true, "", Money::from_cents(500))
            .await
            .unwrap();

        let saved = store.load().await.unwrap().unwrap();
        assert_eq!(saved.balance, "5.00");
        assert_eq!(saved.history.len(), 1);
    }

    #[tokio::test]
    async fn test_validation_error_saves_nothing() {
        let store = Arc::new(MemoryStore::new());
        let manager = PotManager::open(store.clone(), Participants::default()).await;
        let err = manager
            .record_purchase(Money::from_cents(100), Side::First, "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PotError::Ledger(LedgerError::InsufficientFunds { .. })
        ));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_starts_empty_and_failed_save_is_reported() {
        let manager = PotManager::open(Arc::new(BrokenStore), Participants::default()).await;
        assert_eq!(manager.balance().await, Money::ZERO);

        let err = manager
            .record_bet(false, false, "", Money::from_cents(500))
            .await
            .unwrap_err();
        assert!(err.is_not_durable());
        // Applied in memory even though the save failed
        assert_eq!(manager.balance().await, Money::from_cents(1000));
    }
}
