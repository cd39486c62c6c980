//! Bearer-token injection and 401 handling around a single HTTP call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::request::{FormPart, FormValue, PreparedRequest, RequestBody, RequestDefaults, RequestOptions};
use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::navigation::{Navigator, RouteName};
use crate::session::Session;
use crate::store::TokenStore;

/// What to do when the backend answers 401.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthErrorPolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Navigate to the login page and return `Ok(None)`.
    RedirectToLogin,
}

/// The HTTP client every authenticated call goes through.
///
/// Shares the token slot, the session flags and the navigator with the
/// route guard and the session store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &ApiConfig,
        tokens: Arc<dyn TokenStore>,
        session: Arc<Session>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()?;
        info!(endpoint = config.base_url(), "Creating API client.");
        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            tokens,
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Sends `options` to `path` with the persisted bearer token attached.
    ///
    /// Returns `Ok(Some(body))` on a 2xx answer. On 401 the session is
    /// ended first; with [`AuthErrorPolicy::RedirectToLogin`] the call then
    /// navigates to the login page and returns `Ok(None)`, otherwise the
    /// error is returned. Every other failure is returned unchanged.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
        policy: AuthErrorPolicy,
    ) -> Result<Option<T>, FetchError> {
        let epoch = self.session.epoch();
        let bearer = self.tokens.get().await?;
        self.session.sync_with_token(bearer.is_some(), epoch);

        let defaults = RequestDefaults {
            base_url: self.base_url.clone(),
            bearer: bearer.clone(),
        };
        let prepared = PreparedRequest::merge(path, options, &defaults)?;

        match self.dispatch(prepared).await {
            Ok(body) => Ok(Some(decode(&body)?)),
            Err(e) if e.is_unauthorized() => {
                self.end_rejected_session(bearer.as_deref()).await;
                match policy {
                    AuthErrorPolicy::RedirectToLogin => {
                        info!(path, "Unauthorized; redirecting to login.");
                        self.navigator.redirect(RouteName::Login);
                        Ok(None)
                    }
                    AuthErrorPolicy::Propagate => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`ApiClient::fetch`] but for endpoints whose body is ignored.
    pub async fn send(&self, path: &str, options: RequestOptions, policy: AuthErrorPolicy) -> Result<(), FetchError> {
        self.fetch::<Value>(path, options, policy).await.map(|_| ())
    }

    async fn dispatch(&self, prepared: PreparedRequest) -> Result<Vec<u8>, FetchError> {
        debug!(
            method = %prepared.method,
            url = prepared.url.as_str(),
            bearer = prepared.headers.contains_key(reqwest::header::AUTHORIZATION),
            "Dispatching request."
        );

        let mut request = self
            .http
            .request(prepared.method.clone(), &prepared.url)
            .headers(prepared.headers)
            .query(&prepared.query);
        request = match prepared.body {
            Some(RequestBody::Json(body)) => request.json(&body),
            Some(RequestBody::Multipart(parts)) => request.multipart(build_form(parts)?),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            return Ok(body);
        }

        let error = status_error(status, &body);
        warn!(
            method = %prepared.method,
            url = prepared.url.as_str(),
            status = status.as_u16(),
            "Request failed."
        );
        Err(error)
    }

    /// Clears the token and the authenticated flag after a 401, unless the
    /// token was replaced while the request was in flight.
    async fn end_rejected_session(&self, sent_with: Option<&str>) {
        let Some(sent_with) = sent_with else {
            return;
        };
        match self.tokens.clear_if(sent_with).await {
            Ok(true) => self.session.set_authenticated(false),
            Ok(false) => debug!("Ignoring 401 for a token that has since been replaced."),
            Err(e) => warn!("Could not clear token after 401: {}", e),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, FetchError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))
}

fn status_error(status: StatusCode, body: &[u8]) -> FetchError {
    let body: Option<Value> = serde_json::from_slice(body).ok();
    let message = body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.to_string());
    FetchError::Status {
        status: status.as_u16(),
        body,
        message,
    }
}

fn build_form(parts: Vec<FormPart>) -> Result<Form, FetchError> {
    let mut form = Form::new();
    for part in parts {
        form = match part.value {
            FormValue::Text(value) => form.text(part.name, value),
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let file = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&content_type)?;
                form.part(part.name, file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{HistoryNavigator, NavEvent};
    use crate::store::MemoryTokenStore;
    use mockito::{Matcher, Server};
    use serde_json::json;

    struct Harness {
        client: ApiClient,
        tokens: Arc<MemoryTokenStore>,
        session: Arc<Session>,
        navigator: Arc<HistoryNavigator>,
    }

    fn harness(url: String, token: Option<&str>) -> Harness {
        let tokens = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token("accessToken", t),
            None => MemoryTokenStore::new("accessToken"),
        });
        let session = Arc::new(Session::new());
        let navigator = Arc::new(HistoryNavigator::new());
        let config = ApiConfig {
            endpoint: url,
            timeout_in_ms: 5_000,
        };
        let client = ApiClient::new(&config, tokens.clone(), session.clone(), navigator.clone()).unwrap();
        Harness {
            client,
            tokens,
            session,
            navigator,
        }
    }

    #[tokio::test]
    async fn anonymous_requests_carry_no_authorization() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/brands")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"status": 200, "data": []}"#)
            .create_async()
            .await;

        let h = harness(server.url(), None);
        let body: Option<Value> = h
            .client
            .fetch("/brands", RequestOptions::get(), AuthErrorPolicy::Propagate)
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(body.unwrap()["status"], 200);
        assert!(!h.session.is_authenticated());
    }

    #[tokio::test]
    async fn persisted_token_is_sent_as_bearer() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/orders")
            .match_header("authorization", "Bearer T")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let h = harness(server.url(), Some("T"));
        let body: Option<Vec<Value>> = h
            .client
            .fetch("/orders", RequestOptions::get().query("page", "2"), AuthErrorPolicy::Propagate)
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(body, Some(vec![]));
        assert!(h.session.is_authenticated());
    }

    #[tokio::test]
    async fn json_bodies_are_posted() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/colors")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"name": "red"})))
            .with_status(201)
            .with_body(r#"{"status": 201}"#)
            .create_async()
            .await;

        let h = harness(server.url(), Some("T"));
        h.client
            .send("/colors", RequestOptions::post().json(json!({"name": "red"})), AuthErrorPolicy::Propagate)
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_with_redirect_returns_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/profile")
            .with_status(401)
            .with_body(r#"{"message": "Unauthenticated."}"#)
            .create_async()
            .await;

        let h = harness(server.url(), Some("expired"));
        let body: Option<Value> = h
            .client
            .fetch("/profile", RequestOptions::get(), AuthErrorPolicy::RedirectToLogin)
            .await
            .unwrap();

        assert!(body.is_none());
        assert!(!h.session.is_authenticated());
        assert_eq!(h.tokens.get().await.unwrap(), None);
        assert_eq!(h.navigator.events(), vec![NavEvent::Redirected(RouteName::Login)]);
    }

    #[tokio::test]
    async fn unauthorized_without_redirect_propagates() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/profile")
            .with_status(401)
            .with_body(r#"{"message": "Unauthenticated."}"#)
            .create_async()
            .await;

        let h = harness(server.url(), Some("expired"));
        let err = h
            .client
            .fetch::<Value>("/profile", RequestOptions::get(), AuthErrorPolicy::Propagate)
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "request failed with status 401: Unauthenticated.");
        assert!(!h.session.is_authenticated());
        assert!(h.navigator.events().is_empty());
    }

    #[tokio::test]
    async fn other_statuses_pass_through_untouched() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/items")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let h = harness(server.url(), Some("T"));
        let err = h
            .client
            .fetch::<Value>("/items", RequestOptions::get(), AuthErrorPolicy::RedirectToLogin)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.body().is_none());
        assert!(h.session.is_authenticated());
        assert_eq!(h.tokens.get().await.unwrap().as_deref(), Some("T"));
        assert!(h.navigator.events().is_empty());
    }

    #[tokio::test]
    async fn undecodable_bodies_are_decode_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/sizes")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let h = harness(server.url(), None);
        let err = h
            .client
            .fetch::<Value>("/sizes", RequestOptions::get(), AuthErrorPolicy::Propagate)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn empty_success_bodies_decode_as_null() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/logout")
            .with_status(204)
            .create_async()
            .await;

        let h = harness(server.url(), Some("T"));
        let body: Option<Option<Value>> = h
            .client
            .fetch("/logout", RequestOptions::post(), AuthErrorPolicy::Propagate)
            .await
            .unwrap();
        assert_eq!(body, Some(None));
    }

    #[tokio::test]
    async fn network_failures_are_reported() {
        let h = harness("http://127.0.0.1:1".into(), Some("T"));
        let err = h
            .client
            .fetch::<Value>("/orders", RequestOptions::get(), AuthErrorPolicy::RedirectToLogin)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(h.session.is_authenticated());
    }

    #[tokio::test]
    async fn stale_unauthorized_keeps_a_newer_token() {
        let h = harness("http://127.0.0.1:1".into(), Some("old"));
        let bearer = h.tokens.get().await.unwrap();
        h.tokens.set("new").await.unwrap();
        h.session.set_authenticated(true);
        h.client.end_rejected_session(bearer.as_deref()).await;

        assert_eq!(h.tokens.get().await.unwrap().as_deref(), Some("new"));
        assert!(h.session.is_authenticated());
    }
}
