//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wallet_gateway::config::{DeploymentMode, GatewayConfig};
use wallet_gateway::http::{build_router, AppState};
use wallet_gateway::session::{SessionClaims, SessionSecret};
use wallet_gateway::wallet::{
    ConnectionData, SignatureVerifier, VerificationOutcome, VerifierError,
};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Verifier with a canned answer that counts how often it was asked.
pub struct StubVerifier {
    answer: Result<VerificationOutcome, u16>,
    calls: AtomicUsize,
}

impl StubVerifier {
    pub fn accepting() -> Arc<Self> {
        Self::with(Ok(VerificationOutcome::valid()))
    }

    pub fn rejecting(message: &str) -> Arc<Self> {
        Self::with(Ok(VerificationOutcome::rejected(message)))
    }

    /// Fails as if the verifier service answered with `status`.
    pub fn failing(status: u16) -> Arc<Self> {
        Self::with(Err(status))
    }

    fn with(answer: Result<VerificationOutcome, u16>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureVerifier for StubVerifier {
    async fn verify_connection(
        &self,
        _data: &ConnectionData,
    ) -> Result<VerificationOutcome, VerifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Ok(outcome) => Ok(outcome.clone()),
            Err(status) => Err(VerifierError::Status(*status)),
        }
    }
}

pub fn test_config(mode: DeploymentMode) -> GatewayConfig {
    let mut config = GatewayConfig {
        mode,
        ..GatewayConfig::default()
    };
    config.session.secret = Some(TEST_SECRET.to_string());
    config.security.cookie_domain = Some(".site.example".to_string());
    config
}

pub fn test_state(config: GatewayConfig, verifier: Arc<dyn SignatureVerifier>) -> AppState {
    let secret = SessionSecret::from_string(TEST_SECRET).unwrap();
    AppState::new(config, &secret, verifier).unwrap()
}

pub fn app(verifier: Arc<dyn SignatureVerifier>) -> (AppState, Router) {
    let state = test_state(test_config(DeploymentMode::Development), verifier);
    let router = build_router(state.clone());
    (state, router)
}

pub fn session_token(state: &AppState, address: &str) -> String {
    state
        .codec
        .issue(&SessionClaims {
            address: address.to_string(),
            network_id: 1,
            name: "Eternl".to_string(),
        })
        .unwrap()
}

pub fn connect_body() -> Value {
    serde_json::json!({
        "token": "84582aa201276761646472657373581d61",
        "wallet": {
            "address": "addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3",
            "networkId": 1,
            "name": "Eternl"
        }
    })
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// `name=value` part of a `Set-Cookie` header.
pub fn cookie_pair(set_cookie: &str) -> &str {
    set_cookie.split(';').next().unwrap().trim()
}
