//! Reading the session from a request.

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use thiserror::Error;

use crate::http::response::GatewayError;
use crate::http::server::AppState;
use crate::session::codec::{InvalidSession, SessionCodec, SessionPayload};
use crate::wallet::cookies::{cookie_value, SESSION_COOKIE};

/// Why a request carries no usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionRejection {
    #[error("no session cookie")]
    Missing,

    #[error(transparent)]
    Invalid(#[from] InvalidSession),
}

impl SessionRejection {
    /// Whether the client should be told its session is gone rather than
    /// forged. Missing and expired sessions qualify.
    pub fn session_expired(self) -> bool {
        match self {
            SessionRejection::Missing => true,
            SessionRejection::Invalid(reason) => reason.is_expired(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionRejection::Missing => "missing",
            SessionRejection::Invalid(reason) => reason.as_str(),
        }
    }
}

impl From<SessionRejection> for GatewayError {
    fn from(rejection: SessionRejection) -> Self {
        GatewayError::Unauthenticated {
            session_expired: rejection.session_expired(),
        }
    }
}

/// Validate the `wallet_session` cookie, if any.
pub fn session_from_headers(
    headers: &HeaderMap,
    codec: &SessionCodec,
) -> Result<SessionPayload, SessionRejection> {
    let token = cookie_value(headers, SESSION_COOKIE).ok_or(SessionRejection::Missing)?;
    Ok(codec.validate(token)?)
}

/// Extractor yielding the caller's verified session.
///
/// Reuses the payload the gateway middleware attached for `require_session`
/// paths; otherwise validates the cookie itself.
#[derive(Debug, Clone)]
pub struct WalletSession(pub SessionPayload);

impl FromRequestParts<AppState> for WalletSession {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(payload) = parts.extensions.get::<SessionPayload>() {
            return Ok(WalletSession(payload.clone()));
        }

        match session_from_headers(&parts.headers, &state.codec) {
            Ok(payload) => Ok(WalletSession(payload)),
            Err(rejection) => {
                tracing::debug!(reason = rejection.as_str(), "Session rejected");
                Err(rejection.into())
            }
        }
    }
}
