//! Per-key token-bucket rate limiting.
//!
//! Buckets are created lazily and refilled on read, so idle keys cost nothing
//! between requests and no background refill task is needed. The registry is
//! an owned component shared through `AppState`; a periodic sweep evicts
//! buckets that have been full and untouched for the configured idle TTL.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

use crate::http::response::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Default bucket capacity.
pub const DEFAULT_CAPACITY: f64 = 10.0;

/// Default refill rate in tokens per second.
pub const DEFAULT_FILL_RATE: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn refill(&mut self, capacity: f64, fill_rate: f64, now: Instant) {
        if now > self.last_refill {
            let elapsed = now.duration_since(self.last_refill).as_secs_f64();
            self.tokens = (self.tokens + elapsed * fill_rate).min(capacity);
            self.last_refill = now;
        }
    }
}

/// A single token bucket. Refill and consume run under the bucket's own lock,
/// so `0 <= tokens <= capacity` holds for every interleaving.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    fill_rate: f64,
    state: Mutex<BucketState>,
}

impl RateLimiter {
    /// Create a bucket starting at full capacity.
    pub fn new(capacity: f64, fill_rate: f64) -> Self {
        Self {
            capacity,
            fill_rate,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn fill_rate(&self) -> f64 {
        self.fill_rate
    }

    /// Tokens currently stored, as of the last refill.
    pub fn tokens(&self) -> f64 {
        self.lock().tokens
    }

    pub fn refill(&self) {
        self.refill_at(Instant::now());
    }

    pub fn refill_at(&self, now: Instant) {
        self.lock().refill(self.capacity, self.fill_rate, now);
    }

    /// Take `n` tokens if available. On rejection the bucket is left as it was
    /// after refilling.
    pub fn try_consume(&self, n: f64) -> bool {
        self.try_consume_at(n, Instant::now())
    }

    pub fn try_consume_at(&self, n: f64, now: Instant) -> bool {
        if !(n.is_finite() && n >= 0.0) {
            return false;
        }

        let mut state = self.lock();
        state.refill(self.capacity, self.fill_rate, now);
        if state.tokens >= n {
            state.tokens -= n;
            true
        } else {
            false
        }
    }

    /// Full and untouched for at least `max_idle`.
    fn is_idle(&self, now: Instant, max_idle: Duration) -> bool {
        let state = self.lock();
        let idle_for = now.saturating_duration_since(state.last_refill);
        let projected = state.tokens + idle_for.as_secs_f64() * self.fill_rate;
        idle_for >= max_idle && projected >= self.capacity
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BucketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry of buckets keyed by client identifier.
#[derive(Debug, Default)]
pub struct RateLimiterRegistry {
    buckets: DashMap<String, Arc<RateLimiter>>,
}

impl RateLimiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the bucket for `key`, creating a full one if none exists.
    /// Lookup-or-insert is atomic: concurrent callers get the same bucket.
    pub fn get_or_create(&self, key: &str, capacity: f64, fill_rate: f64) -> Arc<RateLimiter> {
        if let Some(bucket) = self.buckets.get(key) {
            return bucket.value().clone();
        }
        self.buckets
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::new(capacity, fill_rate)))
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drop buckets that are full and have not been used for `max_idle`.
    /// Returns the number removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        self.evict_idle_at(Instant::now(), max_idle)
    }

    pub fn evict_idle_at(&self, now: Instant, max_idle: Duration) -> usize {
        let before = self.buckets.len();
        // A bucket still held by an in-flight request is kept.
        self.buckets
            .retain(|_, bucket| Arc::strong_count(bucket) > 1 || !bucket.is_idle(now, max_idle));
        before.saturating_sub(self.buckets.len())
    }
}

/// Periodically evict idle buckets until shutdown.
pub async fn run_eviction(
    registry: Arc<RateLimiterRegistry>,
    interval: Duration,
    idle_ttl: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = registry.evict_idle(idle_ttl);
                metrics::record_rate_limiter_buckets(registry.len());
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = registry.len(), "Evicted idle rate limit buckets");
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Rate limiter eviction stopped");
                return;
            }
        }
    }
}

/// Identify the caller.
///
/// A direct peer is its own key. When the peer is a trusted proxy (or the
/// request carries no connect info), `X-Forwarded-For` is walked from the
/// right, skipping trusted hops; the first untrusted hop is the client.
pub fn client_key(request: &Request<Body>, trusted_proxies: &[IpAddr]) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = peer {
        if !trusted_proxies.contains(&ip) {
            return ip.to_string();
        }
    }

    let hops: Vec<&str> = request
        .headers()
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .collect();

    let untrusted = hops.iter().rev().find(|hop| {
        hop.parse::<IpAddr>()
            .map_or(true, |ip| !trusted_proxies.contains(&ip))
    });

    match (untrusted.or(hops.first()), peer) {
        (Some(hop), _) => (*hop).to_string(),
        (None, Some(ip)) => ip.to_string(),
        (None, None) => "unknown".to_string(),
    }
}

/// Middleware that rejects callers whose bucket is empty with 429.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = &state.config.rate_limit;
    if !config.enabled {
        return next.run(request).await;
    }

    let key = client_key(&request, &config.trusted_proxies);
    let bucket = state
        .rate_limiters
        .get_or_create(&key, config.capacity, config.fill_rate);

    if bucket.try_consume(1.0) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        metrics::record_rate_limited(request.uri().path());
        GatewayError::RateLimited.into_response()
    }
}
