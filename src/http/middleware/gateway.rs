//! Path-policy gateway middleware.
//!
//! # Responsibilities
//! - Resolve each request path to a [`Policy`] via the shared `PolicyTable`
//! - `no_cache`: forward, then stamp uncacheable headers on the response
//! - `require_session`: redirect anonymous callers to the login page; attach
//!   the verified `SessionPayload` for everyone else
//! - `pass_through` and unmatched paths: forward untouched
//!
//! # Design Decisions
//! - Runs outside the route table so rule paths need no handler of their own
//! - Redirects are `307` so the method and body survive the round trip

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::form_urlencoded::byte_serialize;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::Policy;
use crate::security::headers::apply_no_cache;
use crate::session::session_from_headers;

pub async fn gateway_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(policy) = state.policies.evaluate(request.uri().path()) else {
        return next.run(request).await;
    };

    match policy {
        Policy::PassThrough => {
            metrics::record_policy_decision(policy.as_str(), "forwarded");
            next.run(request).await
        }
        Policy::NoCache => {
            metrics::record_policy_decision(policy.as_str(), "forwarded");
            let mut response = next.run(request).await;
            apply_no_cache(response.headers_mut());
            response
        }
        Policy::RequireSession => {
            match session_from_headers(request.headers(), &state.codec) {
                Ok(session) => {
                    metrics::record_policy_decision(policy.as_str(), "forwarded");
                    request.extensions_mut().insert(session);
                    next.run(request).await
                }
                Err(rejection) => {
                    let target = login_redirect(
                        &state.config.gateway.unauthenticated_path,
                        &request,
                    );
                    tracing::info!(
                        path = %request.uri().path(),
                        reason = rejection.as_str(),
                        "Redirecting unauthenticated request"
                    );
                    metrics::record_policy_decision(policy.as_str(), "redirected");
                    Redirect::temporary(&target).into_response()
                }
            }
        }
    }
}

/// `{login_path}?redirect={encoded path and query}`.
pub fn login_redirect<B>(login_path: &str, request: &Request<B>) -> String {
    let original = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| request.uri().path());
    let encoded: String = byte_serialize(original.as_bytes()).collect();
    format!("{}?redirect={}", login_path, encoded)
}
