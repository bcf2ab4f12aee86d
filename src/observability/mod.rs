//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!     → tracing.rs (per-request span carrying the request ID)
//!
//! Consumers:
//!     → stdout (plain or JSON)
//!     → Prometheus scrape listener (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every event of a request
//! - Tokens and secrets are never logged; wallet addresses are

pub mod logging;
pub mod metrics;
pub mod tracing;
