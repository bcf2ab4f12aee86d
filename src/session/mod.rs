//! Stateless wallet sessions.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     session.secret | WALLET_SESSION_SECRET
//!     → secret.rs (length check, ephemeral fallback in development)
//!     → codec.rs (keyed HMAC-SHA256 codec)
//!
//! Connect:
//!     SessionClaims → SessionCodec::issue → signed token → wallet_session cookie
//!
//! Later requests:
//!     Cookie header → extract.rs → SessionCodec::validate → SessionPayload
//! ```
//!
//! # Design Decisions
//! - Nothing is stored server-side; the token carries identity and expiry
//! - Validation failures are values, never faults

pub mod codec;
pub mod extract;
pub mod secret;

pub use codec::{
    InvalidSession, SessionClaims, SessionCodec, SessionError, SessionPayload,
    DEFAULT_SESSION_TTL,
};
pub use extract::{session_from_headers, SessionRejection, WalletSession};
pub use secret::{SecretError, SessionSecret};
