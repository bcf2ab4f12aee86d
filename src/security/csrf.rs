//! Anti-forgery tokens paired with the session cookie.
//!
//! The token is handed to the page in a script-readable cookie; state-changing
//! requests echo it back in `X-CSRF-Token`.

use axum::{
    body::Body,
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::http::response::GatewayError;
use crate::wallet::cookies::{cookie_value, CSRF_COOKIE, SESSION_COOKIE};

/// Request header carrying the client's copy of the token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Generate a fresh random token (32 bytes, base64url).
pub fn issue_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time comparison of two tokens of any length.
///
/// Both sides are hashed first so the comparison always runs over 32 bytes;
/// differing lengths simply produce different digests.
pub fn tokens_match(provided: &str, stored: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(stored.as_bytes());
    let diff = a
        .iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0 && !stored.is_empty()
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Reject state-changing requests from a session holder whose CSRF header does
/// not match the CSRF cookie. Requests without a session cookie have nothing to
/// forge and pass.
pub async fn csrf_middleware(request: Request<Body>, next: Next) -> Response {
    if !is_state_changing(request.method()) {
        return next.run(request).await;
    }

    let headers = request.headers();
    if cookie_value(headers, SESSION_COOKIE).is_none() {
        return next.run(request).await;
    }

    let stored = cookie_value(headers, CSRF_COOKIE).unwrap_or_default();
    let provided = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if tokens_match(provided, stored) {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "CSRF token mismatch");
        GatewayError::CsrfMismatch.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::post, Router};
    use tower::ServiceExt;

    #[test]
    fn test_issue_is_unique_and_url_safe() {
        let a = issue_token();
        let b = issue_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_compare() {
        let token = issue_token();
        assert!(tokens_match(&token, &token));
        assert!(!tokens_match(&issue_token(), &token));
    }

    #[test]
    fn test_length_mismatch_rejects_without_fault() {
        assert!(!tokens_match("short", "a-much-longer-stored-token"));
        assert!(!tokens_match("", "stored"));
        assert!(!tokens_match("prefix", "prefix-and-more"));
    }

    #[test]
    fn test_empty_stored_never_matches() {
        assert!(!tokens_match("", ""));
    }

    fn app() -> Router {
        Router::new()
            .route("/change", post(|| async { "changed" }))
            .layer(middleware::from_fn(csrf_middleware))
    }

    fn post_with(cookie: Option<&str>, header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::POST).uri("/change");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        if let Some(header) = header {
            builder = builder.header(CSRF_HEADER, header);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_middleware_requires_matching_header() {
        let cookie = "wallet_session=abc; csrf_token=tok123";

        let ok = app()
            .oneshot(post_with(Some(cookie), Some("tok123")))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let missing = app().oneshot(post_with(Some(cookie), None)).await.unwrap();
        assert_eq!(missing.status(), StatusCode::FORBIDDEN);

        let wrong = app()
            .oneshot(post_with(Some(cookie), Some("tok124")))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_middleware_ignores_requests_without_session() {
        let response = app().oneshot(post_with(None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
