use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::store::StoreConfig;
use crate::error::ConfigError;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
const DEFAULT_TIMEOUT_IN_MS: u64 = 10_000;

/// Main config: backend API, token slot, extra pages and logging.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub routes: RouteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The backend every request is sent to.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Transport-level timeout for a single request.
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

impl ApiConfig {
    /// The endpoint without trailing slashes, ready for `base + path` joins.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_in_ms: default_timeout_in_ms(),
        }
    }
}

/// Pages known to the route guard on top of the built-in admin pages.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct RouteConfig {
    #[serde(default)]
    pub pages: Vec<PageConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct PageConfig {
    pub name: String,
    /// Path pattern; segments starting with `:` match any single segment.
    pub path: String,
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_timeout_in_ms() -> u64 {
    DEFAULT_TIMEOUT_IN_MS
}

/// Layered configuration sources, later ones win:
/// YAML file, then `API_ENDPOINT`, then `ADMINAUTH_*` variables (`__` nests).
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(
            Env::raw()
                .only(&["API_ENDPOINT"])
                .map(|_| "api.endpoint".into()),
        )
        .merge(Env::prefixed("ADMINAUTH_").split("__"))
}

/// Load config from `path`, or from "config.yaml" in the current directory.
/// A missing file is not an error; every field has a default.
pub fn load_config(path: Option<&Path>) -> Result<ConfigV1, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    let config = figment(path).extract::<ConfigV1>()?;
    Ok(config)
}

/// The JSON schema for the configuration, pretty-printed.
pub fn schema_json() -> Result<String, serde_json::Error> {
    let schema = schema_for!(ConfigV1);
    serde_json::to_string_pretty(&schema)
}
