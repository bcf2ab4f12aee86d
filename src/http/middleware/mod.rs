//! Request middleware.
//!
//! Layered in `server::build_router`, outermost first:
//! request ID → trace span → timeout → CORS → gateway policy → route-specific
//! (rate limit on connect, CSRF on disconnect).

pub mod gateway;

pub use gateway::gateway_middleware;
