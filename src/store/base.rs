use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{file_store::FileTokenStore, memory_store::MemoryTokenStore};
use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;

/// The TokenStore trait abstracts the persisted bearer-token slot (get, set, clear).
///
/// Implementations treat an empty string as "no token": `get` never returns
/// `Some("")` and `set("")` behaves like `clear`. Clearing an empty slot is
/// not an error.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>, StoreError>;
    async fn set(&self, token: &str) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;

    /// Clears the slot only if it still holds `expected`, as one step with
    /// respect to other calls on the same store. Returns whether it cleared.
    async fn clear_if(&self, expected: &str) -> Result<bool, StoreError>;

    /// The slot name, for log messages.
    fn key(&self) -> &str;
}

/// Creates a concrete token store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Arc<dyn TokenStore> {
    match &config.backend {
        StoreBackend::Memory => {
            info!(key = config.key.as_str(), "Using in-memory token store.");
            Arc::new(MemoryTokenStore::new(&config.key))
        }
        StoreBackend::File { path } => {
            info!(
                key = config.key.as_str(),
                path = %path.display(),
                "Using file-backed token store."
            );
            Arc::new(FileTokenStore::new(&config.key, path))
        }
    }
}

/// Normalises a raw slot value: blank means absent.
pub(crate) fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
