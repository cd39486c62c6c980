//! Application startup.
//!
//! Builds the token store from configuration and wires the session, the
//! fetch helper, the guard and the stores around it.

use std::sync::Arc;

use tracing::info;

use crate::client::ApiClient;
use crate::config::ConfigV1;
use crate::error::FetchError;
use crate::guard::RouteGuard;
use crate::navigation::{Navigator, RouteTable};
use crate::profile::ProfileStore;
use crate::session::{Session, SessionStore};
use crate::state::AppState;
use crate::store::{create_store, TokenStore};

/// Builds the application state with a store chosen by `config.store`.
pub fn build(config: Arc<ConfigV1>, navigator: Arc<dyn Navigator>) -> Result<AppState, FetchError> {
    let tokens = create_store(&config.store);
    build_with_store(config, tokens, navigator)
}

/// Builds the application state around an existing token store.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_with_store(
    config: Arc<ConfigV1>,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
) -> Result<AppState, FetchError> {
    let session = Arc::new(Session::new());
    let client = ApiClient::new(&config.api, tokens.clone(), session.clone(), navigator.clone())?;
    let routes = RouteTable::from_config(&config.routes.pages);
    let guard = RouteGuard::new(routes, tokens.clone(), session.clone(), navigator);

    info!(
        endpoint = config.api.base_url(),
        token_key = tokens.key(),
        "Admin client initialised."
    );

    Ok(AppState {
        config,
        tokens,
        session,
        sessions: SessionStore::new(client.clone()),
        profile: ProfileStore::new(client.clone()),
        client,
        guard,
    })
}
