//! Login and logout.

use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};

use super::state::Session;
use crate::client::{ApiClient, AuthErrorPolicy, RequestOptions};
use crate::error::LoginError;
use crate::models::{Credentials, LoginResponse};
use crate::navigation::RouteName;

pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";

/// The actions that move the session between anonymous and authenticated.
#[derive(Clone)]
pub struct SessionStore {
    client: ApiClient,
}

impl SessionStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.client.session()
    }

    /// Exchanges credentials for a token.
    ///
    /// On success the token is persisted, the session becomes authenticated,
    /// the navigator is sent home and the decoded response is returned.
    /// `is_submitting` is raised for the duration of the call.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, LoginError> {
        let credentials = Credentials::new(email, password);
        let _submitting = self.session().begin_login(credentials.clone());
        let epoch = self.session().epoch();

        match self.try_login(&credentials, epoch).await {
            Ok(response) => {
                info!("Login succeeded.");
                Ok(response)
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                Err(e)
            }
        }
    }

    async fn try_login(&self, credentials: &Credentials, epoch: u64) -> Result<LoginResponse, LoginError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let response: Option<LoginResponse> = self
            .client
            .fetch(LOGIN_PATH, RequestOptions::post().json(body), AuthErrorPolicy::Propagate)
            .await?;

        let response = response.ok_or(LoginError::AuthNoToken)?;
        let token = response.token().ok_or(LoginError::AuthNoToken)?;

        if !self.session().is_current(epoch) {
            return Err(LoginError::UnknownError(
                "logged out while the login request was in flight".to_string(),
            ));
        }
        self.client.tokens().set(token).await?;
        if !self.session().authenticate_if_current(epoch) {
            self.client.tokens().clear_if(token).await?;
            return Err(LoginError::UnknownError(
                "logged out while the login request was in flight".to_string(),
            ));
        }

        self.client.navigator().redirect(RouteName::Index);
        Ok(response)
    }

    /// Ends the session. Never fails: the backend is told on a best-effort
    /// basis, and local state is cleared regardless of its answer. Logins
    /// still in flight when this starts can no longer commit.
    pub async fn logout(&self) {
        let _submitting = self.session().begin_submit();
        self.session().invalidate();

        if let Err(e) = self
            .client
            .send(LOGOUT_PATH, RequestOptions::post(), AuthErrorPolicy::Propagate)
            .await
        {
            warn!("Logout request failed, clearing session anyway: {}", e);
        }

        if let Err(e) = self.client.tokens().clear().await {
            error!("Could not clear persisted token on logout: {}", e);
        }
        // Anything that read the old token while it was being cleared
        // belongs to the previous generation.
        self.session().invalidate();
        self.client.navigator().redirect(RouteName::Login);
        info!("Logged out.");
    }
}
