//! Wallet connect, disconnect and session-check handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::response::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::csrf;
use crate::session::{session_from_headers, SessionClaims, WalletSession};
use crate::wallet::types::{ConnectionRequest, DEFAULT_WALLET_NAME};

/// Furthest point a connect attempt reached. Logged on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectStage {
    Received,
    ShapeValidated,
    SignatureVerified,
    SessionIssued,
}

/// `POST /wallet/connect`
pub async fn connect(State(state): State<AppState>, body: Bytes) -> Response {
    let mut stage = ConnectStage::Received;

    match establish_session(&state, &body, &mut stage).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(stage = ?stage, reason = err.reason(), "Wallet connect rejected");
            metrics::record_connect_rejected(err.reason());
            err.into_response()
        }
    }
}

async fn establish_session(
    state: &AppState,
    body: &[u8],
    stage: &mut ConnectStage,
) -> Result<Response, GatewayError> {
    let expose = state.expose_errors();

    let request: ConnectionRequest =
        serde_json::from_slice(body).map_err(|_| GatewayError::MalformedRequest)?;
    let (data, return_url) = request.into_connection_data()?;

    if !state.verifier.validate_shape(&data) {
        return Err(GatewayError::MalformedRequest);
    }
    *stage = ConnectStage::ShapeValidated;

    let outcome = state
        .verifier
        .verify_connection(&data)
        .await
        .map_err(|err| GatewayError::unexpected(err, expose))?;
    if !outcome.is_valid {
        let message = if outcome.message.is_empty() {
            "Signature verification failed".to_string()
        } else {
            outcome.message
        };
        return Err(GatewayError::SignatureRejected(message));
    }
    *stage = ConnectStage::SignatureVerified;

    let wallet = data.data;
    let claims = SessionClaims {
        address: wallet.address,
        network_id: wallet.network_id,
        name: wallet
            .name
            .unwrap_or_else(|| DEFAULT_WALLET_NAME.to_string()),
    };
    let token = state
        .codec
        .issue(&claims)
        .map_err(|err| GatewayError::unexpected(err, expose))?;
    let csrf_token = csrf::issue_token();
    *stage = ConnectStage::SessionIssued;

    let return_url = state.origins.sanitize_return_url(return_url.as_deref());

    let mut response = Json(json!({
        "success": true,
        "message": "Wallet connected successfully",
        "returnUrl": return_url,
    }))
    .into_response();
    append_cookies(
        response.headers_mut(),
        [
            state.cookies.session_cookie(&token),
            state.cookies.csrf_cookie(&csrf_token),
        ],
    )
    .map_err(|err| GatewayError::unexpected(err, expose))?;

    tracing::info!(
        address = %claims.address,
        network_id = claims.network_id,
        wallet = %claims.name,
        "Wallet connected"
    );
    metrics::record_session_issued();
    Ok(response)
}

fn append_cookies<const N: usize>(
    headers: &mut HeaderMap,
    cookies: [String; N],
) -> Result<(), header::InvalidHeaderValue> {
    for cookie in cookies {
        headers.append(header::SET_COOKIE, HeaderValue::from_str(&cookie)?);
    }
    Ok(())
}

/// `POST /wallet/disconnect`
pub async fn disconnect(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    if let Ok(session) = session_from_headers(&headers, &state.codec) {
        tracing::info!(address = %session.address, "Wallet disconnected");
    }

    let mut response = Json(json!({"success": true})).into_response();
    append_cookies(
        response.headers_mut(),
        [
            state.cookies.clear_session_cookie(),
            state.cookies.clear_csrf_cookie(),
        ],
    )
    .map_err(|err| GatewayError::unexpected(err, state.expose_errors()))?;
    Ok(response)
}

/// `GET /wallet/session`
pub async fn session_status(WalletSession(session): WalletSession) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "address": session.address,
        "networkId": session.network_id,
        "name": session.name,
        "expiresAt": session.expires_at,
    }))
}
