//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `upstream.target_url`.
pub const TARGET_URL_ENV: &str = "TARGET_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file, apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;
    finish(config)
}

/// Build configuration from defaults and environment overrides alone.
pub fn load_default() -> Result<ProxyConfig, ConfigError> {
    finish(ProxyConfig::default())
}

fn finish(mut config: ProxyConfig) -> Result<ProxyConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(TARGET_URL_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!(target_url = %url, "Upstream overridden from environment");
        config.upstream.target_url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_override_replaces_target() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == TARGET_URL_ENV).then(|| "http://127.0.0.1:5678/webhook/x".to_string())
        });
        assert_eq!(config.upstream.target_url, "http://127.0.0.1:5678/webhook/x");
    }

    #[test]
    fn test_blank_env_override_is_ignored() {
        let mut config = ProxyConfig::default();
        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config.upstream.target_url, crate::config::schema::DEFAULT_TARGET_URL);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:3000"

            [pagination]
            max_page_size = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:3000");
        assert_eq!(config.pagination.max_page_size, 500);
        assert_eq!(config.pagination.default_page_size, 100);
        assert_eq!(config.cors.max_age_secs, 86_400);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [upstream]
            target_url = "https://example.com/webhook/orders"

            [observability]
            metrics_enabled = false
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        // TARGET_URL may be set in the environment running the tests.
        if std::env::var(TARGET_URL_ENV).is_err() {
            assert_eq!(config.upstream.target_url, "https://example.com/webhook/orders");
        }
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_load_config_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [listener]
            bind_address = "not-an-address"

            [pagination]
            default_page_size = 0
            "#
        )
        .unwrap();

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => assert!(errors.len() >= 2),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_load_config_reports_syntax_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nbind_address = 1").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
