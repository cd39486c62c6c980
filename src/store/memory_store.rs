use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::base::{non_empty, TokenStore};
use crate::error::StoreError;

/// A token slot that lives as long as the process.
pub struct MemoryTokenStore {
    key: String,
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            token: RwLock::new(None),
        }
    }

    /// A store that already holds `token`, as after an earlier login.
    pub fn with_token(key: &str, token: &str) -> Self {
        Self {
            key: key.to_string(),
            token: RwLock::new(non_empty(Some(token.to_string()))),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<String>, StoreError> {
        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);
        Ok(token.clone())
    }

    async fn set(&self, token: &str) -> Result<(), StoreError> {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = non_empty(Some(token.to_string()));
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        Ok(())
    }

    async fn clear_if(&self, expected: &str) -> Result<bool, StoreError> {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if slot.as_deref() != Some(expected) {
            return Ok(false);
        }
        *slot = None;
        Ok(true)
    }

    fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_clear() {
        let store = MemoryTokenStore::new("accessToken");
        assert_eq!(store.get().await.unwrap(), None);

        store.set("abc").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("abc"));

        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clearing_twice_is_harmless() {
        let store = MemoryTokenStore::with_token("accessToken", "abc");
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn conditional_clear_only_removes_the_expected_token() {
        let store = MemoryTokenStore::with_token("accessToken", "new");
        assert!(!store.clear_if("old").await.unwrap());
        assert_eq!(store.get().await.unwrap().as_deref(), Some("new"));

        assert!(store.clear_if("new").await.unwrap());
        assert_eq!(store.get().await.unwrap(), None);
        assert!(!store.clear_if("new").await.unwrap());
    }

    #[tokio::test]
    async fn empty_token_counts_as_cleared() {
        let store = MemoryTokenStore::with_token("accessToken", "abc");
        store.set("").await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
        assert_eq!(MemoryTokenStore::with_token("k", "").get().await.unwrap(), None);
    }
}
