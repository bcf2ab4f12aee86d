//! Wallet connection subsystem.
//!
//! # Data Flow
//! ```text
//! POST /wallet/connect {token, wallet, returnUrl?}
//!     → types.rs (required fields present?)            → 400
//!     → verifier.rs validate_shape                       → 400
//!     → verifier.rs verify_connection (external)         → 401 / 500
//!     → session::SessionCodec::issue + csrf::issue_token
//!     → cookies.rs (wallet_session, csrf_token)
//!     → 200 {success, message, returnUrl}
//!
//! POST /wallet/disconnect → expire both cookies
//! GET  /wallet/session    → decoded session or 401
//! ```

pub mod cookies;
pub mod handlers;
pub mod types;
pub mod verifier;

pub use cookies::{CookiePolicy, CSRF_COOKIE, SESSION_COOKIE};
pub use types::{ConnectionData, ConnectionRequest, WalletInfo};
pub use verifier::{HttpVerifier, SignatureVerifier, VerificationOutcome, VerifierError};
