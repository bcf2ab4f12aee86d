//! Path policy table.
//!
//! # Responsibilities
//! - Hold the ordered `(pattern, policy)` rules
//! - Resolve a request path to the policy that governs it
//!
//! # Design Decisions
//! - Immutable after construction, shared via `Arc` without locks
//! - First match wins; rule order is configuration order
//! - Unmatched paths yield `None` and are not intercepted

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RuleConfig;
use crate::routing::matcher::PathPattern;

/// What the gateway does with a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Forward, and mark the response uncacheable.
    NoCache,
    /// Forward only with a valid session; otherwise redirect.
    RequireSession,
    /// Forward unchanged.
    PassThrough,
}

impl Policy {
    pub fn as_str(self) -> &'static str {
        match self {
            Policy::NoCache => "no_cache",
            Policy::RequireSession => "require_session",
            Policy::PassThrough => "pass_through",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: PathPattern,
    policy: Policy,
}

/// Compiled, ordered rule set.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    rules: Vec<Rule>,
}

impl PolicyTable {
    pub fn from_config(rules: &[RuleConfig]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| Rule {
                pattern: PathPattern::parse(&rule.pattern),
                policy: rule.policy,
            })
            .collect();
        Self { rules }
    }

    /// Policy of the first rule matching `path`.
    pub fn evaluate(&self, path: &str) -> Option<Policy> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.policy)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
