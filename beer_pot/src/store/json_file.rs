//! Single JSON file backend.

use async_trait::async_trait;
use log::debug;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use super::{
    errors::{StoreError, StoreResult},
    repository::LedgerStore,
    timeouts::{DEFAULT_STORE_TIMEOUT, with_timeout},
};
use crate::ledger::LedgerDocument;

/// File name inside the application directory
pub const DEFAULT_FILE_NAME: &str = "wette_pot.json";

/// Ledger stored as one pretty-printed JSON document.
///
/// Saves go to a sibling temp file first and are then renamed over the
/// target, so a crash mid-write never leaves a truncated ledger behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    timeout: Duration,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Store at `<dir>/wette_pot.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LedgerStore for JsonFileStore {
    async fn load(&self) -> StoreResult<Option<LedgerDocument>> {
        let bytes = match with_timeout(self.timeout, tokio::fs::read(&self.path)).await {
            Ok(bytes) => bytes,
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No ledger file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let document = serde_json::from_slice(&bytes)?;
        Ok(Some(document))
    }

    async fn save(&self, document: &LedgerDocument) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(document)?;
        let temp = self.temp_path();

        with_timeout(self.timeout, async {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&temp, &json).await?;
            tokio::fs::rename(&temp, &self.path).await
        })
        .await?;

        debug!(
            "Saved {} entries to {}",
            document.history.len(),
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
