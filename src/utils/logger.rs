use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::ConfigError;

/// Parses `logging.level` into a filter.
pub fn parse_level(level: &str) -> Result<LevelFilter, ConfigError> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}

pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), ConfigError> {
    let level_filter = parse_level(&logging_config.level)?;

    // RUST_LOG directives still apply on top of the configured default.
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    let result = match logging_config.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
        // "console" and anything unknown
        _ => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().pretty())
            .try_init(),
    };
    result.map_err(|e| ConfigError::LoggingInit(e.to_string()))
}
