//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets come from the environment in preference to the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    DeploymentMode, GatewayConfig, GatewayRulesConfig, ListenerConfig, ObservabilityConfig,
    RateLimitConfig, RuleConfig, SecurityConfig, SessionConfig, TimeoutConfig, VerifierConfig,
};
pub use validation::{validate_config, ValidationError};
