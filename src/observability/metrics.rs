//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wallet_sessions_issued_total` (counter): sessions issued by connect
//! - `wallet_connect_rejected_total` (counter): connect failures by reason
//! - `wallet_rate_limited_total` (counter): requests refused with 429, by path
//! - `gateway_policy_decisions_total` (counter): gateway outcomes by policy
//! - `wallet_rate_limiter_buckets` (gauge): live rate limiter buckets
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - The Prometheus exporter serves its own listener on `metrics_address`

use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

const SESSIONS_ISSUED: &str = "wallet_sessions_issued_total";
const CONNECT_REJECTED: &str = "wallet_connect_rejected_total";
const RATE_LIMITED: &str = "wallet_rate_limited_total";
const POLICY_DECISIONS: &str = "gateway_policy_decisions_total";
const LIMITER_BUCKETS: &str = "wallet_rate_limiter_buckets";

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_descriptions();
    tracing::info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

fn register_descriptions() {
    describe_counter!(SESSIONS_ISSUED, Unit::Count, "Wallet sessions issued");
    describe_counter!(
        CONNECT_REJECTED,
        Unit::Count,
        "Wallet connect attempts rejected, by reason"
    );
    describe_counter!(
        RATE_LIMITED,
        Unit::Count,
        "Requests refused by the rate limiter"
    );
    describe_counter!(
        POLICY_DECISIONS,
        Unit::Count,
        "Gateway path policy outcomes"
    );
    describe_gauge!(
        LIMITER_BUCKETS,
        Unit::Count,
        "Rate limiter buckets currently held"
    );
}

pub fn record_session_issued() {
    counter!(SESSIONS_ISSUED).increment(1);
}

pub fn record_connect_rejected(reason: &'static str) {
    counter!(CONNECT_REJECTED, "reason" => reason).increment(1);
}

pub fn record_rate_limited(path: &str) {
    counter!(RATE_LIMITED, "path" => path.to_string()).increment(1);
}

/// `outcome` is `forwarded` or `redirected`.
pub fn record_policy_decision(policy: &'static str, outcome: &'static str) {
    counter!(POLICY_DECISIONS, "policy" => policy, "outcome" => outcome).increment(1);
}

pub fn record_rate_limiter_buckets(count: usize) {
    gauge!(LIMITER_BUCKETS).set(count as f64);
}
