//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{DeploymentMode, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `session.secret`.
pub const SECRET_ENV_VAR: &str = "WALLET_SESSION_SECRET";

/// Environment variable overriding `mode`.
pub const MODE_ENV_VAR: &str = "WALLET_GATEWAY_MODE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid WALLET_GATEWAY_MODE: {0}")]
    Mode(String),

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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;
    finalize(config, |key| std::env::var(key).ok())
}

/// Build a configuration from defaults plus environment overrides.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    finalize(GatewayConfig::default(), |key| std::env::var(key).ok())
}

/// Apply environment overrides, then validate.
pub(crate) fn finalize(
    mut config: GatewayConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<GatewayConfig, ConfigError> {
    if let Some(secret) = env(SECRET_ENV_VAR).filter(|s| !s.is_empty()) {
        config.session.secret = Some(secret);
    }
    if let Some(mode) = env(MODE_ENV_VAR) {
        config.mode = mode.parse::<DeploymentMode>().map_err(ConfigError::Mode)?;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_secret_and_mode() {
        let secret = "0123456789abcdef0123456789abcdef";
        let config = finalize(
            GatewayConfig::default(),
            env_from(&[(SECRET_ENV_VAR, secret), (MODE_ENV_VAR, "production")]),
        )
        .unwrap();

        assert!(config.mode.is_production());
        assert_eq!(config.session.secret.as_deref(), Some(secret));
    }

    #[test]
    fn test_production_without_secret_fails_fast() {
        let err = finalize(
            GatewayConfig::default(),
            env_from(&[(MODE_ENV_VAR, "production")]),
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::MissingSecret])
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_bad_mode() {
        let err = finalize(GatewayConfig::default(), env_from(&[(MODE_ENV_VAR, "qa")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Mode(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!(
            "wallet-gateway-config-{}.toml",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [rate_limit]
            capacity = 5.0
            fill_rate = 0.5
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.rate_limit.capacity, 5.0);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_validation_error_display_lists_all() {
        let err = ConfigError::Validation(vec![
            ValidationError::MissingSecret,
            ValidationError::NotPositive("session.ttl_secs"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("Validation failed: "));
        assert!(text.contains("required in production"));
        assert!(text.contains("session.ttl_secs must be greater than zero"));
    }
}
