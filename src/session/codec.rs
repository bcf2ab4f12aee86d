//! Signed session tokens.
//!
//! Token layout: `base64url(header) "." base64url(payload) "." base64url(mac)`
//! where `mac = HMAC-SHA256(secret, header_b64 "." payload_b64)`. No padding.
//!
//! The codec is stateless: validation recomputes the MAC and never consults
//! server-side storage.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::session::secret::SessionSecret;

type HmacSha256 = Hmac<Sha256>;

/// The only accepted `alg` header value.
pub const SESSION_ALGORITHM: &str = "HS256";

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Identity carried by a session, as supplied by the connect flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub address: String,
    pub network_id: i64,
    pub name: String,
}

/// Decoded, verified session contents. Timestamps are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub address: String,
    pub network_id: i64,
    pub name: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Why a token failed validation. Never a fault: callers treat all of these
/// as "no valid session".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidSession {
    #[error("session token is malformed")]
    Malformed,

    #[error("session token signature does not match")]
    BadSignature,

    #[error("session token uses an unsupported algorithm")]
    UnsupportedAlgorithm,

    #[error("session token has expired")]
    Expired,
}

impl InvalidSession {
    pub fn is_expired(self) -> bool {
        self == InvalidSession::Expired
    }

    /// Short label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidSession::Malformed => "malformed",
            InvalidSession::BadSignature => "bad_signature",
            InvalidSession::UnsupportedAlgorithm => "unsupported_algorithm",
            InvalidSession::Expired => "expired",
        }
    }
}

/// Failure to produce a token.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to encode session payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid session key length")]
    Key,
}

/// Issues and validates HMAC-SHA256 session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    mac: HmacSha256,
    header: String,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: &SessionSecret, ttl: Duration) -> Result<Self, SessionError> {
        let mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
            .map_err(|_| SessionError::Key)?;
        let header = serde_json::to_vec(&TokenHeader {
            alg: SESSION_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        })?;

        Ok(Self {
            mac,
            header: URL_SAFE_NO_PAD.encode(header),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token valid from now for the configured TTL.
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        self.issue_at(claims, unix_now())
    }

    pub fn issue_at(&self, claims: &SessionClaims, now: u64) -> Result<String, SessionError> {
        let payload = SessionPayload {
            address: claims.address.clone(),
            network_id: claims.network_id,
            name: claims.name.clone(),
            issued_at: now,
            expires_at: now.saturating_add(self.ttl.as_secs()),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?);

        let signature = self.sign(&self.header, &payload).finalize().into_bytes();
        Ok(format!(
            "{}.{}.{}",
            self.header,
            payload,
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Validate a token against the current time.
    pub fn validate(&self, token: &str) -> Result<SessionPayload, InvalidSession> {
        self.validate_at(token, unix_now())
    }

    pub fn validate_at(&self, token: &str, now: u64) -> Result<SessionPayload, InvalidSession> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(InvalidSession::Malformed);
        };

        let header_json = decode_segment(header)?;
        let parsed: TokenHeader =
            serde_json::from_slice(&header_json).map_err(|_| InvalidSession::Malformed)?;
        if parsed.alg != SESSION_ALGORITHM {
            return Err(InvalidSession::UnsupportedAlgorithm);
        }

        let signature = decode_segment(signature)?;
        self.sign(header, payload)
            .verify_slice(&signature)
            .map_err(|_| InvalidSession::BadSignature)?;

        let payload_json = decode_segment(payload)?;
        let session: SessionPayload =
            serde_json::from_slice(&payload_json).map_err(|_| InvalidSession::Malformed)?;

        if now > session.expires_at {
            return Err(InvalidSession::Expired);
        }
        Ok(session)
    }

    fn sign(&self, header: &str, payload: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac
    }
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("algorithm", &SESSION_ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, InvalidSession> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| InvalidSession::Malformed)
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
