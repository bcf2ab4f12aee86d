//! Error responses.
//!
//! # Responsibilities
//! - Map every handler-level failure to a status code and JSON body
//! - Keep internal details out of client-visible 500s
//!
//! # Design Decisions
//! - Bodies always carry `success: false` and an `error` string
//! - `Unexpected` logs its message server-side; clients see only a generic text
//!   unless the error was built with details exposed (development mode)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt::Display;
use thiserror::Error;

/// Handler-boundary error taxonomy.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or unparseable request fields.
    #[error("Invalid request parameters")]
    MalformedRequest,

    /// No usable session. `session_expired` is set when the session is known
    /// to be gone (absent or past expiry) rather than forged.
    #[error("Authentication required")]
    Unauthenticated { session_expired: bool },

    /// The signature verifier refused the connection.
    #[error("{0}")]
    SignatureRejected(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Invalid CSRF token")]
    CsrfMismatch,

    #[error("Unexpected error: {message}")]
    Unexpected { message: String, expose: bool },
}

impl GatewayError {
    /// Wrap any fault as a 500. `expose` puts the message in the body.
    pub fn unexpected(err: impl Display, expose: bool) -> Self {
        GatewayError::Unexpected {
            message: err.to_string(),
            expose,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedRequest => StatusCode::BAD_REQUEST,
            GatewayError::Unauthenticated { .. } | GatewayError::SignatureRejected(_) => {
                StatusCode::UNAUTHORIZED
            }
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::CsrfMismatch => StatusCode::FORBIDDEN,
            GatewayError::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            GatewayError::MalformedRequest => "malformed_request",
            GatewayError::Unauthenticated { .. } => "unauthenticated",
            GatewayError::SignatureRejected(_) => "signature_rejected",
            GatewayError::RateLimited => "rate_limited",
            GatewayError::CsrfMismatch => "csrf_mismatch",
            GatewayError::Unexpected { .. } => "unexpected",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            GatewayError::Unauthenticated { session_expired } => json!({
                "success": false,
                "error": self.to_string(),
                "sessionExpired": session_expired,
            }),
            GatewayError::Unexpected { message, expose } => {
                tracing::error!(error = %message, "Internal server error");
                if *expose {
                    json!({
                        "success": false,
                        "error": "Internal server error",
                        "details": message,
                    })
                } else {
                    json!({
                        "success": false,
                        "error": "Internal server error",
                    })
                }
            }
            other => json!({
                "success": false,
                "error": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
