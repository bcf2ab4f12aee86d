//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Resolve secret → Build AppState → Bind listener
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Broadcast → stop accepting → drain in-flight requests → stop sweep → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then state, then listeners
//! - One broadcast channel fans the shutdown out to every task

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_state, StartupError};
