use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `POST /login` request body.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The `POST /login` response. Backends disagree on where the token goes,
/// so both the nested `data.token` and a top-level `token` are accepted.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_code: Option<Value>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub data: Option<TokenResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenResponse {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl LoginResponse {
    /// The first non-empty token: `data.token`, then `token`.
    pub fn token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.token.as_deref())
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.as_deref().filter(|t| !t.is_empty()))
    }
}
