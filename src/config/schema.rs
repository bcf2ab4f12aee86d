//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::routing::Policy;

/// Root configuration for the wallet gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment mode (affects cookie flags, local origins, error details).
    pub mode: DeploymentMode,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Session token settings.
    pub session: SessionConfig,

    /// Origin, return-URL and cookie scoping.
    pub security: SecurityConfig,

    /// Token-bucket rate limiting for the connect endpoint.
    pub rate_limit: RateLimitConfig,

    /// Path policy table.
    pub gateway: GatewayRulesConfig,

    /// External signature verifier.
    pub verifier: VerifierConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Development or production deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Development,
    Production,
}

impl DeploymentMode {
    pub fn is_production(self) -> bool {
        self == DeploymentMode::Production
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Development => f.write_str("development"),
            DeploymentMode::Production => f.write_str("production"),
        }
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(DeploymentMode::Development),
            "production" | "prod" => Ok(DeploymentMode::Production),
            other => Err(format!("unknown deployment mode '{}'", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Session token configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC signing secret. Overridden by `WALLET_SESSION_SECRET`.
    /// Required in production.
    pub secret: Option<String>,

    /// Session lifetime in seconds (also the cookie Max-Age).
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_secs: 2 * 60 * 60,
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

/// Origin and cookie security settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Origins accepted for cross-origin requests (exact match).
    pub allowed_origins: Vec<String>,

    /// Extra origins accepted only in development mode.
    pub dev_origins: Vec<String>,

    /// Absolute-URL prefixes a connect `returnUrl` may start with.
    pub allowed_return_prefixes: Vec<String>,

    /// Where to send the client when `returnUrl` is absent or rejected.
    pub default_return_url: String,

    /// Parent domain for cookies in production (e.g. ".site.example").
    pub cookie_domain: Option<String>,

    /// Require `X-CSRF-Token` on state-changing session routes.
    pub enforce_csrf: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://site.example".to_string(),
                "https://www.site.example".to_string(),
            ],
            dev_origins: vec!["http://localhost:3000".to_string()],
            allowed_return_prefixes: vec![
                "https://site.example".to_string(),
                "https://www.site.example".to_string(),
            ],
            default_return_url: "https://site.example".to_string(),
            cookie_domain: None,
            enforce_csrf: false,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting on the connect endpoint.
    pub enabled: bool,

    /// Bucket capacity (burst size).
    pub capacity: f64,

    /// Tokens added per second.
    pub fill_rate: f64,

    /// Buckets untouched (and full) for this long are evicted.
    pub idle_ttl_secs: u64,

    /// How often the eviction sweep runs.
    pub eviction_interval_secs: u64,

    /// Reverse proxies whose `X-Forwarded-For` header is believed. Requests
    /// from any other peer are keyed by the socket address alone.
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 10.0,
            fill_rate: 1.0,
            idle_ttl_secs: 600,
            eviction_interval_secs: 60,
            trusted_proxies: vec![
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(Ipv6Addr::LOCALHOST),
            ],
        }
    }
}

/// A single `(pattern, policy)` entry of the gateway table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuleConfig {
    /// Exact path, or a prefix when ending in `/*`.
    pub pattern: String,

    pub policy: Policy,
}

impl RuleConfig {
    fn new(pattern: &str, policy: Policy) -> Self {
        Self {
            pattern: pattern.to_string(),
            policy,
        }
    }
}

/// Gateway policy table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayRulesConfig {
    /// Redirect target for requests lacking a valid session.
    pub unauthenticated_path: String,

    /// Ordered rules; first match wins.
    pub rules: Vec<RuleConfig>,
}

impl Default for GatewayRulesConfig {
    fn default() -> Self {
        Self {
            unauthenticated_path: "/not-authenticated".to_string(),
            rules: vec![
                RuleConfig::new("/wallet/connect", Policy::NoCache),
                RuleConfig::new("/wallet/session", Policy::NoCache),
                RuleConfig::new("/wallet/disconnect", Policy::NoCache),
                RuleConfig::new("/wallet/dashboard/*", Policy::RequireSession),
                RuleConfig::new("/user/*", Policy::RequireSession),
                RuleConfig::new("/wallet/*", Policy::PassThrough),
                RuleConfig::new("/mint/*", Policy::PassThrough),
                RuleConfig::new("/api/mint/*", Policy::PassThrough),
            ],
        }
    }
}

/// External signature verifier settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Endpoint receiving `{token, data}` and answering `{isValid, message}`.
    pub url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8090/verify".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.mode, DeploymentMode::Development);
        assert_eq!(config.session.ttl_secs, 7200);
        assert_eq!(config.rate_limit.capacity, 10.0);
        assert_eq!(config.rate_limit.fill_rate, 1.0);
        assert_eq!(config.gateway.rules.len(), 8);
    }

    #[test]
    fn test_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            mode = "production"

            [security]
            cookie_domain = ".site.example"

            [rate_limit]
            trusted_proxies = ["10.0.0.1", "fd00::1"]

            [[gateway.rules]]
            pattern = "/account/*"
            policy = "require_session"
            "#,
        )
        .unwrap();

        assert!(config.mode.is_production());
        assert_eq!(config.security.cookie_domain.as_deref(), Some(".site.example"));
        assert_eq!(config.security.default_return_url, "https://site.example");
        assert_eq!(
            config.gateway.rules,
            vec![RuleConfig::new("/account/*", Policy::RequireSession)]
        );
        assert_eq!(config.gateway.unauthenticated_path, "/not-authenticated");
        assert_eq!(
            config.rate_limit.trusted_proxies,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "fd00::1".parse::<IpAddr>().unwrap(),
            ]
        );
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("prod".parse::<DeploymentMode>(), Ok(DeploymentMode::Production));
        assert_eq!(
            "Development".parse::<DeploymentMode>(),
            Ok(DeploymentMode::Development)
        );
        assert!("staging".parse::<DeploymentMode>().is_err());
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let session = SessionConfig {
            secret: Some("super-secret-value-that-is-long-enough".into()),
            ttl_secs: 60,
        };
        let printed = format!("{:?}", session);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
