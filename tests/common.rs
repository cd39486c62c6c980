#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use adminauth::config::{ApiConfig, ConfigV1, StoreConfig};
use adminauth::error::StoreError;
use adminauth::navigation::HistoryNavigator;
use adminauth::startup::build_with_store;
use adminauth::state::AppState;
use adminauth::store::{MemoryTokenStore, TokenStore};
use async_trait::async_trait;
use tokio::sync::Notify;

pub struct TestApp {
    pub app: AppState,
    pub tokens: Arc<dyn TokenStore>,
    pub navigator: Arc<HistoryNavigator>,
}

impl TestApp {
    pub async fn token(&self) -> Option<String> {
        self.tokens.get().await.expect("token store read failed")
    }
}

pub fn test_config(endpoint: &str) -> ConfigV1 {
    ConfigV1 {
        api: ApiConfig {
            endpoint: endpoint.to_string(),
            timeout_in_ms: 5_000,
        },
        store: StoreConfig::default(),
        ..ConfigV1::default()
    }
}

fn memory_store(token: Option<&str>) -> MemoryTokenStore {
    match token {
        Some(t) => MemoryTokenStore::with_token("accessToken", t),
        None => MemoryTokenStore::new("accessToken"),
    }
}

fn build_around(endpoint: &str, tokens: Arc<dyn TokenStore>) -> TestApp {
    let navigator = Arc::new(HistoryNavigator::new());
    let app = build_with_store(
        Arc::new(test_config(endpoint)),
        tokens.clone(),
        navigator.clone(),
    )
    .expect("failed to build app");

    TestApp {
        app,
        tokens,
        navigator,
    }
}

/// Builds the full application against `endpoint`, optionally already
/// holding a persisted token.
pub fn build_app(endpoint: &str, token: Option<&str>) -> TestApp {
    build_around(endpoint, Arc::new(memory_store(token)))
}

/// Like [`build_app`], but the first `op` on the token store parks until
/// the gate is released.
pub fn build_gated_app(endpoint: &str, token: Option<&str>, op: StoreOp) -> (TestApp, Arc<Gate>) {
    let gate = Arc::new(Gate {
        op,
        armed: AtomicBool::new(true),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let tokens = Arc::new(GatedTokenStore {
        inner: memory_store(token),
        gate: gate.clone(),
    });
    (build_around(endpoint, tokens), gate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Get,
    Set,
    Clear,
    ClearIf,
}

/// One-shot pause point inside a token store call.
pub struct Gate {
    op: StoreOp,
    armed: AtomicBool,
    /// Signalled once the gated call has started.
    pub entered: Notify,
    /// Lets the gated call continue.
    pub release: Notify,
}

struct GatedTokenStore {
    inner: MemoryTokenStore,
    gate: Arc<Gate>,
}

impl GatedTokenStore {
    async fn pause(&self, op: StoreOp) {
        if self.gate.op == op && self.gate.armed.swap(false, Ordering::SeqCst) {
            self.gate.entered.notify_one();
            self.gate.release.notified().await;
        }
    }
}

#[async_trait]
impl TokenStore for GatedTokenStore {
    async fn get(&self) -> Result<Option<String>, StoreError> {
        self.pause(StoreOp::Get).await;
        self.inner.get().await
    }

    async fn set(&self, token: &str) -> Result<(), StoreError> {
        self.pause(StoreOp::Set).await;
        self.inner.set(token).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.pause(StoreOp::Clear).await;
        self.inner.clear().await
    }

    async fn clear_if(&self, expected: &str) -> Result<bool, StoreError> {
        self.pause(StoreOp::ClearIf).await;
        self.inner.clear_if(expected).await
    }

    fn key(&self) -> &str {
        self.inner.key()
    }
}

/// An endpoint nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";
