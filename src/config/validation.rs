//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ttl > 0, rates > 0)
//! - Check URL-shaped settings parse as absolute http(s) URLs
//! - Enforce production preconditions (signing secret present)
//! - Keep the login redirect target a plain, ungated path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::{Policy, PolicyTable};
use crate::session::secret::MIN_SECRET_LEN;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("session.secret must be at least {min} bytes", min = MIN_SECRET_LEN)]
    SecretTooShort,

    #[error("session.secret (or WALLET_SESSION_SECRET) is required in production")]
    MissingSecret,

    #[error("{field} '{value}' is not an absolute http(s) URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("security.allowed_origins entry '{0}' must be a bare origin (scheme://host[:port])")]
    InvalidOrigin(String),

    #[error("security.allowed_origins must not be empty in production")]
    NoOrigins,

    #[error("gateway path '{0}' must start with '/'")]
    InvalidPath(String),

    #[error("gateway.unauthenticated_path '{0}' must be a plain path without query, fragment, whitespace or control characters")]
    InvalidLoginPath(String),

    #[error("gateway.unauthenticated_path '{0}' is gated by a require_session rule")]
    GatedLoginPath(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::NotPositive("timeouts.request_secs"));
    }
    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::NotPositive("session.ttl_secs"));
    }
    if config.verifier.timeout_secs == 0 {
        errors.push(ValidationError::NotPositive("verifier.timeout_secs"));
    }

    match &config.session.secret {
        Some(secret) if secret.len() < MIN_SECRET_LEN => {
            errors.push(ValidationError::SecretTooShort)
        }
        None if config.mode.is_production() => errors.push(ValidationError::MissingSecret),
        _ => {}
    }

    let rate_limit = &config.rate_limit;
    if !(rate_limit.capacity.is_finite() && rate_limit.capacity > 0.0) {
        errors.push(ValidationError::NotPositive("rate_limit.capacity"));
    }
    if !(rate_limit.fill_rate.is_finite() && rate_limit.fill_rate > 0.0) {
        errors.push(ValidationError::NotPositive("rate_limit.fill_rate"));
    }
    if rate_limit.eviction_interval_secs == 0 {
        errors.push(ValidationError::NotPositive("rate_limit.eviction_interval_secs"));
    }

    let security = &config.security;
    check_url(
        "security.default_return_url",
        &security.default_return_url,
        &mut errors,
    );
    for prefix in &security.allowed_return_prefixes {
        check_url("security.allowed_return_prefixes", prefix, &mut errors);
    }
    for origin in security.allowed_origins.iter().chain(&security.dev_origins) {
        if !is_bare_origin(origin) {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }
    if config.mode.is_production() && security.allowed_origins.is_empty() {
        errors.push(ValidationError::NoOrigins);
    }

    let gateway = &config.gateway;
    let login_path = &gateway.unauthenticated_path;
    if !login_path.starts_with('/') {
        errors.push(ValidationError::InvalidPath(login_path.clone()));
    } else if !is_plain_path(login_path) {
        errors.push(ValidationError::InvalidLoginPath(login_path.clone()));
    } else if PolicyTable::from_config(&gateway.rules).evaluate(login_path)
        == Some(Policy::RequireSession)
    {
        errors.push(ValidationError::GatedLoginPath(login_path.clone()));
    }
    for rule in &gateway.rules {
        if !rule.pattern.starts_with('/') {
            errors.push(ValidationError::InvalidPath(rule.pattern.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    let ok = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false);
    if !ok {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

/// Safe to embed in a `Location` header ahead of `?redirect=`.
fn is_plain_path(path: &str) -> bool {
    !path
        .chars()
        .any(|c| c.is_control() || c.is_whitespace() || matches!(c, '?' | '#'))
}

/// `Origin` header values never carry a path, so neither may allow-list entries.
fn is_bare_origin(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.has_host()
                && url.origin().ascii_serialization() == value
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DeploymentMode, RuleConfig};

    #[test]
    fn test_default_config_is_valid_in_development() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_production_requires_secret() {
        let mut config = GatewayConfig::default();
        config.mode = DeploymentMode::Production;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingSecret]);

        config.session.secret = Some("x".repeat(MIN_SECRET_LEN));
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.session.ttl_secs = 0;
        config.session.secret = Some("short".into());
        config.rate_limit.fill_rate = 0.0;
        config.security.default_return_url = "/relative".into();
        config.security.allowed_origins = vec!["https://site.example/path".into()];
        config.gateway.rules.push(RuleConfig {
            pattern: "no-slash".into(),
            policy: Policy::PassThrough,
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::BindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::NotPositive("session.ttl_secs")));
        assert!(errors.contains(&ValidationError::SecretTooShort));
        assert!(errors.contains(&ValidationError::NotPositive("rate_limit.fill_rate")));
        assert!(errors.contains(&ValidationError::InvalidUrl {
            field: "security.default_return_url",
            value: "/relative".into(),
        }));
        assert!(errors.contains(&ValidationError::InvalidOrigin(
            "https://site.example/path".into()
        )));
        assert!(errors.contains(&ValidationError::InvalidPath("no-slash".into())));
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn test_unauthenticated_path_must_be_plain_and_ungated() {
        for path in ["/login\n", "/login?next=1", "/login#top", "/log in"] {
            let mut config = GatewayConfig::default();
            config.gateway.unauthenticated_path = path.to_string();
            assert_eq!(
                validate_config(&config),
                Err(vec![ValidationError::InvalidLoginPath(path.to_string())]),
                "{:?}",
                path
            );
        }

        let mut config = GatewayConfig::default();
        config.gateway.unauthenticated_path = "/user/login".to_string();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::GatedLoginPath("/user/login".to_string())])
        );

        config.gateway.unauthenticated_path = "/login".to_string();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_bare_origin() {
        assert!(is_bare_origin("https://site.example"));
        assert!(is_bare_origin("http://localhost:3000"));
        assert!(!is_bare_origin("https://site.example/"));
        assert!(!is_bare_origin("site.example"));
        assert!(!is_bare_origin("ftp://site.example"));
    }
}
