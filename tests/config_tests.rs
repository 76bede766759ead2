//! Tests for configuration module

use progresslog::config::{Config, CONFIG};

#[test]
fn test_config_defaults() {
    let config = Config::from_env();

    if std::env::var("PROGRESSLOG_LOG_LEVEL").is_err() {
        assert_eq!(config.log_level, "info");
    }
    if std::env::var("PROGRESSLOG_LOG_JSON").is_err() {
        assert!(!config.log_json);
    }
}

#[test]
fn test_database_url_default_is_sqlite() {
    if std::env::var("PROGRESSLOG_DATABASE_URL").is_ok() || std::env::var("DATABASE_URL").is_ok()
    {
        return;
    }

    let config = Config::from_env();
    assert!(
        config.database.database_url.starts_with("sqlite://"),
        "Expected sqlite URL, got: {}",
        config.database.database_url
    );
}

#[test]
fn test_version_from_cargo() {
    let config = Config::from_env();
    assert!(!config.version.is_empty());
    assert!(config.version.contains('.'));
}

#[test]
fn test_global_config_matches_from_env() {
    let config = Config::from_env();
    assert_eq!(CONFIG.version, config.version);
    assert_eq!(CONFIG.database.database_url, config.database.database_url);
}
