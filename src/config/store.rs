use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_KEY: &str = "accessToken";

/// Where the persisted bearer token lives:
/// - key: the name of the token slot.
/// - backend: memory (process lifetime) or file (survives restarts).
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct StoreConfig {
    #[serde(default = "default_key")]
    pub key: String,
    #[serde(default)]
    pub backend: StoreBackend,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            backend: StoreBackend::default(),
        }
    }
}

/// The token store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreBackend {
    #[default]
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "file")]
    File { path: PathBuf },
}

fn default_key() -> String {
    DEFAULT_TOKEN_KEY.to_string()
}
