use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::base::{non_empty, TokenStore};
use crate::error::StoreError;

/// A token slot persisted to a single file, so a session survives restarts
/// of the command-line driver the way a cookie survives page reloads.
///
/// Access from one process is serialised, so a conditional clear cannot
/// interleave with a concurrent write.
pub struct FileTokenStore {
    key: String,
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(key: &str, path: &Path) -> Self {
        Self {
            key: key.to_string(),
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(non_empty(Some(raw))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&self.path, token).await?;
        debug!(key = self.key.as_str(), "Token persisted to file.");
        Ok(())
    }

    async fn remove(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(key = self.key.as_str(), "Token file removed.");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Result<Option<String>, StoreError> {
        let _lock = self.lock.lock().await;
        self.read().await
    }

    async fn set(&self, token: &str) -> Result<(), StoreError> {
        let _lock = self.lock.lock().await;
        match non_empty(Some(token.to_string())) {
            Some(token) => self.write(&token).await,
            None => self.remove().await,
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _lock = self.lock.lock().await;
        self.remove().await
    }

    async fn clear_if(&self, expected: &str) -> Result<bool, StoreError> {
        let _lock = self.lock.lock().await;
        if self.read().await?.as_deref() != Some(expected) {
            return Ok(false);
        }
        self.remove().await?;
        Ok(true)
    }

    fn key(&self) -> &str {
        &self.key
    }
}
