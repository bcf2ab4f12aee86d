//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared `AppState`
//! - Create the Axum router with the wallet handlers
//! - Wire up middleware (request ID, tracing, timeout, CORS, gateway policy,
//!   rate limiting, CSRF)
//! - Run the listener and the rate limiter sweep until shutdown

use axum::{
    http::{header, request::Parts, HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::middleware::gateway_middleware;
use crate::http::request::MakeRequestUuidV4;
use crate::lifecycle::Shutdown;
use crate::observability::tracing::request_span;
use crate::routing::PolicyTable;
use crate::security::csrf::{csrf_middleware, CSRF_HEADER};
use crate::security::rate_limit::{rate_limit_middleware, run_eviction};
use crate::security::{OriginGuard, RateLimiterRegistry};
use crate::session::{SessionCodec, SessionError, SessionSecret};
use crate::wallet::cookies::CookiePolicy;
use crate::wallet::handlers;
use crate::wallet::verifier::SignatureVerifier;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub codec: SessionCodec,
    pub cookies: CookiePolicy,
    pub origins: Arc<OriginGuard>,
    pub policies: Arc<PolicyTable>,
    pub rate_limiters: Arc<RateLimiterRegistry>,
    pub verifier: Arc<dyn SignatureVerifier>,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        secret: &SessionSecret,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Result<Self, SessionError> {
        let ttl = Duration::from_secs(config.session.ttl_secs);
        let codec = SessionCodec::new(secret, ttl)?;
        let cookies = CookiePolicy::new(config.mode, &config.security, ttl.as_secs());
        let origins = OriginGuard::from_config(&config.security, config.mode);
        let policies = PolicyTable::from_config(&config.gateway.rules);

        Ok(Self {
            config: Arc::new(config),
            codec,
            cookies,
            origins: Arc::new(origins),
            policies: Arc::new(policies),
            rate_limiters: Arc::new(RateLimiterRegistry::new()),
            verifier,
        })
    }

    /// Whether 500 responses may carry error details.
    pub fn expose_errors(&self) -> bool {
        !self.config.mode.is_production()
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let connect = post(handlers::connect).layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_middleware,
    ));

    let mut disconnect = post(handlers::disconnect);
    if state.config.security.enforce_csrf {
        disconnect = disconnect.layer(middleware::from_fn(csrf_middleware));
    }

    Router::new()
        .route("/wallet/connect", connect)
        .route("/wallet/disconnect", disconnect)
        .route("/wallet/session", get(handlers::session_status))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gateway_middleware,
        ))
        .layer(cors_layer(state.origins.clone()))
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.timeouts.request_secs,
        )))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
        .with_state(state)
}

fn cors_layer(origins: Arc<OriginGuard>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin
                .to_str()
                .map(|origin| origins.validate_origin(origin))
                .unwrap_or(false)
        }))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(CSRF_HEADER)])
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "error": "Not found"})),
    )
}

/// HTTP server for the wallet gateway.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = build_router(state.clone());
        Self { router, state }
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, mode = %self.state.config.mode, "HTTP server starting");

        let rate_limit = &self.state.config.rate_limit;
        if rate_limit.enabled {
            tokio::spawn(run_eviction(
                self.state.rate_limiters.clone(),
                Duration::from_secs(rate_limit.eviction_interval_secs),
                Duration::from_secs(rate_limit.idle_ttl_secs),
                shutdown.subscribe(),
            ));
        }

        let mut stop = shutdown.subscribe();
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
