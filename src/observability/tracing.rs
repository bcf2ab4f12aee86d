//! Request spans.
//!
//! Every request gets one `request` span carrying its correlation ID, so
//! events logged by handlers and middleware inherit `request_id`.

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::request::request_id;

/// `make_span_with` hook for `TraceLayer`.
pub fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request.headers()),
        method = %request.method(),
        path = %request.uri().path(),
    )
}
