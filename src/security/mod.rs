//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → origin.rs (CORS origin predicate)
//!     → rate_limit.rs (per-client token bucket on connect)
//!     → csrf.rs (header/cookie pairing on state-changing routes)
//!     → Pass to handler
//!
//! Outgoing response:
//!     → headers.rs (no-cache directives on session endpoints)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input (return URLs are allow-listed)
//! - Comparisons of secrets run in constant time

pub mod csrf;
pub mod headers;
pub mod origin;
pub mod rate_limit;

pub use origin::OriginGuard;
pub use rate_limit::{RateLimiter, RateLimiterRegistry};
