//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the session secret for the deployment mode
//! - Build the signature verifier client
//! - Assemble the shared `AppState`
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners are bound by the caller, after the state is ready

use std::sync::Arc;
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::http::server::AppState;
use crate::session::{SecretError, SessionError, SessionSecret};
use crate::wallet::verifier::{HttpVerifier, VerifierError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("session secret: {0}")]
    Secret(#[from] SecretError),

    #[error("session codec: {0}")]
    Session(#[from] SessionError),

    #[error("signature verifier: {0}")]
    Verifier(#[from] VerifierError),
}

/// Build the application state from validated configuration.
pub fn build_state(config: GatewayConfig) -> Result<AppState, StartupError> {
    let secret = SessionSecret::resolve(&config.session, config.mode)?;
    let verifier = HttpVerifier::new(&config.verifier)?;

    tracing::info!(
        mode = %config.mode,
        verifier = %config.verifier.url,
        ephemeral_secret = secret.is_ephemeral(),
        session_ttl_secs = config.session.ttl_secs,
        "Initializing gateway state"
    );

    Ok(AppState::new(config, &secret, Arc::new(verifier))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentMode;

    #[test]
    fn test_production_requires_secret() {
        let config = GatewayConfig {
            mode: DeploymentMode::Production,
            ..GatewayConfig::default()
        };
        let err = build_state(config).err().unwrap();
        assert!(matches!(err, StartupError::Secret(SecretError::Missing)));
    }

    #[test]
    fn test_development_starts_without_secret() {
        let state = build_state(GatewayConfig::default()).unwrap();
        assert_eq!(state.config.mode, DeploymentMode::Development);
    }
}
