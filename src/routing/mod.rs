//! Path policy subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     RuleConfig[] (gateway.rules)
//!     → matcher.rs (parse `/exact` and `/prefix/*` patterns)
//!     → router.rs (freeze as ordered PolicyTable)
//!
//! Per request:
//!     path → PolicyTable::evaluate → Some(Policy) | None
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: the same path always resolves to the same policy
//! - First match wins

pub mod matcher;
pub mod router;

pub use router::{Policy, PolicyTable};
