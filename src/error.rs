//! Error types shared across the crate.
//!
//! The fetch helper, the session store and the token stores each return their
//! own enum so callers can match on exactly the failures they can react to.

use serde_json::{json, Value};

/// Failures of a single call made through [`crate::client::ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be built (bad header, bad multipart part, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport failed before a response arrived (DNS, refused, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("request failed with status {status}: {message}")]
    Status {
        status: u16,
        /// The decoded JSON body, when the backend sent one.
        body: Option<Value>,
        message: String,
    },

    /// A 2xx body could not be decoded into the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The persisted token could not be read or cleared.
    #[error("token store error: {0}")]
    TokenStore(#[from] StoreError),
}

impl FetchError {
    /// The HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// The structured error body sent by the backend, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Self::InvalidRequest(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Why a login attempt did not produce a session.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The backend answered 2xx but the response carried no usable token.
    #[error("Login failed. No data returned.")]
    AuthNoToken,

    /// The backend rejected the login with a structured error body.
    #[error("login rejected by API: {0}")]
    ApiError(Value),

    /// Anything else: network failure, undecodable body, storage failure.
    #[error("{0}")]
    UnknownError(String),
}

impl LoginError {
    /// The structured value a login form displays.
    ///
    /// API payloads are forwarded as-is; every other failure becomes
    /// `{"error": message}`.
    pub fn payload(&self) -> Value {
        match self {
            Self::ApiError(body) => body.clone(),
            other => json!({ "error": other.to_string() }),
        }
    }
}

impl From<FetchError> for LoginError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Status {
                body: Some(body), ..
            } => Self::ApiError(body),
            other => Self::UnknownError(other.to_string()),
        }
    }
}

impl From<StoreError> for LoginError {
    fn from(e: StoreError) -> Self {
        Self::UnknownError(e.to_string())
    }
}

/// Token store backend failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and logging setup failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error loading configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("logging already initialised: {0}")]
    LoggingInit(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Load(Box::new(e))
    }
}
