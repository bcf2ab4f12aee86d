//! Session signing secret.
//!
//! # Security
//! - Loaded once at startup from config or `WALLET_SESSION_SECRET`
//! - Never logged or serialized
//! - Development mode may fall back to an ephemeral random key; tokens signed
//!   with it become unverifiable after a restart

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use thiserror::Error;

use crate::config::{DeploymentMode, SessionConfig};

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    #[error("session secret is not configured (required in production)")]
    Missing,

    #[error("session secret must be at least {min} bytes, got {0}", min = MIN_SECRET_LEN)]
    TooShort(usize),
}

/// HMAC key material for session tokens.
#[derive(Clone)]
pub struct SessionSecret {
    bytes: Vec<u8>,
    ephemeral: bool,
}

impl SessionSecret {
    /// Use a configured secret string as key material.
    pub fn from_string(secret: &str) -> Result<Self, SecretError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(SecretError::TooShort(secret.len()));
        }
        Ok(Self {
            bytes: secret.as_bytes().to_vec(),
            ephemeral: false,
        })
    }

    /// Fresh random 32-byte secret held only in memory.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; MIN_SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self {
            bytes,
            ephemeral: true,
        }
    }

    /// Resolve the process secret for the given mode.
    ///
    /// Production refuses to start without a configured secret. Development
    /// generates one and says so.
    pub fn resolve(config: &SessionConfig, mode: DeploymentMode) -> Result<Self, SecretError> {
        match config.secret.as_deref() {
            Some(secret) => Self::from_string(secret),
            None if mode.is_production() => Err(SecretError::Missing),
            None => {
                tracing::warn!(
                    "No session secret configured; using an ephemeral key. \
                     Sessions will not survive a restart and are not shared across instances"
                );
                Ok(Self::generate())
            }
        }
    }

    /// Render a random secret suitable for configuration files.
    pub fn generate_encoded() -> String {
        let mut bytes = [0u8; MIN_SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSecret")
            .field("bytes", &"<redacted>")
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}
