//! Storage trait for the ledger document.
//!
//! Both backends persist the complete [`LedgerDocument`] on every save; there
//! are no partial updates.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::errors::StoreResult;
use crate::ledger::LedgerDocument;

/// Trait for ledger persistence
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load the last saved document, `None` if nothing was ever saved
    async fn load(&self) -> StoreResult<Option<LedgerDocument>>;

    /// Overwrite the stored document
    async fn save(&self, document: &LedgerDocument) -> StoreResult<()>;

    /// Short human description, e.g. the file path
    fn describe(&self) -> String;
}

/// Volatile store kept in process memory.
///
/// Used by tests and as the fallback for a throwaway session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<LedgerDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already saved document
    pub fn with_document(document: LedgerDocument) -> Self {
        Self {
            document: Mutex::new(Some(document)),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load(&self) -> StoreResult<Option<LedgerDocument>> {
        Ok(self.document.lock().await.clone())
    }

    async fn save(&self, document: &LedgerDocument) -> StoreResult<()> {
        *self.document.lock().await = Some(document.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_starts_empty() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemoryStore::with_document(LedgerDocument::default());
        let document = LedgerDocument {
            balance: "5.00".to_string(),
            ..LedgerDocument::default()
        };
        store.save(&document).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(document));
    }
}
