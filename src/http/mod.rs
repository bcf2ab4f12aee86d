//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → request.rs (assign request ID)
//!     → middleware/ (gateway policy, route-specific guards)
//!     → wallet handlers
//!     → response.rs (errors rendered as JSON)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::GatewayError;
pub use server::{build_router, AppState, HttpServer};
