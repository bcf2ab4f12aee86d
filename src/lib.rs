//! Wallet session gateway library.
//!
//! Authenticates browser wallets once, against an external signature
//! verifier, then carries that identity in a signed, stateless session
//! cookie that a path-policy gateway checks on later requests.

pub mod config;
pub mod http;
pub mod routing;
pub mod session;
pub mod wallet;

pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::{build_router, AppState, HttpServer};
pub use lifecycle::Shutdown;
