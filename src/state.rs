//! Shared application state.
//!
//! Everything here shares one token slot, one session and one navigator.

use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::ConfigV1;
use crate::guard::RouteGuard;
use crate::profile::ProfileStore;
use crate::session::{Session, SessionStore};
use crate::store::TokenStore;

/// The wired-up client side of the admin panel.
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The persisted bearer-token slot.
    pub tokens: Arc<dyn TokenStore>,
    pub session: Arc<Session>,
    /// Authenticated fetch helper for arbitrary endpoints.
    pub client: ApiClient,
    /// Login and logout.
    pub sessions: SessionStore,
    pub guard: RouteGuard,
    pub profile: ProfileStore,
}
