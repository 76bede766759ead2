pub mod database;

use once_cell::sync::Lazy;
use std::env;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: database::DatabaseConfig,

    // Build info
    pub version: String,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database: database::DatabaseConfig::from_env(),

            // Build info
            version: env!("CARGO_PKG_VERSION").to_string(),

            // Logging
            log_level: env::var("PROGRESSLOG_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: env::var("PROGRESSLOG_LOG_JSON")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
