//! Request descriptors and the defaults-merge policy.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

use crate::error::FetchError;

/// What a caller wants to send. Unset fields fall back to the client defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Defaults to GET.
    pub method: Option<Method>,
    /// Overrides the configured API endpoint for this call.
    pub base_url: Option<String>,
    /// Replace default headers with the same name (case-insensitive).
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::Text(value.to_string()),
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::File {
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
                bytes,
            },
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    pub fn method(method: Method) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(RequestBody::Multipart(parts));
        self
    }
}

/// What the client contributes to every request.
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub base_url: String,
    pub bearer: Option<String>,
}

/// A request with defaults applied, ready for dispatch.
#[derive(Debug)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl PreparedRequest {
    /// Applies `options` over `defaults`: per key, the caller's value wins;
    /// anything the caller leaves unset comes from the defaults.
    pub fn merge(path: &str, options: RequestOptions, defaults: &RequestDefaults) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &defaults.bearer {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| FetchError::InvalidRequest(format!("bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FetchError::InvalidRequest(format!("header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FetchError::InvalidRequest(format!("header '{}': {}", name, e)))?;
            headers.insert(name, value);
        }

        let base_url = options.base_url.as_deref().unwrap_or(&defaults.base_url);

        Ok(Self {
            method: options.method.unwrap_or(Method::GET),
            url: join_url(base_url, path),
            headers,
            query: options.query,
            body: options.body,
        })
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
