//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse rule patterns (`/exact`, `/prefix/*`)
//! - Match request paths against them
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Prefix patterns match on segment boundaries: `/mint/*` matches `/mint`
//!   and `/mint/x` but not `/mintage`
//! - No regex, so matching is a plain string comparison

use std::fmt;

/// A compiled rule pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    /// Stored without the trailing `/*`.
    Prefix(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/*") {
            Some(prefix) => PathPattern::Prefix(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.is_empty(),
                None => false,
            },
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Exact(exact) => f.write_str(exact),
            PathPattern::Prefix(prefix) => write!(f, "{}/*", prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern() {
        let pattern = PathPattern::parse("/wallet/connect");
        assert_eq!(pattern, PathPattern::Exact("/wallet/connect".into()));

        assert!(pattern.matches("/wallet/connect"));
        assert!(!pattern.matches("/wallet/connect/"));
        assert!(!pattern.matches("/wallet/connected"));
        assert!(!pattern.matches("/WALLET/connect"));
    }

    #[test]
    fn test_prefix_pattern() {
        let pattern = PathPattern::parse("/mint/*");
        assert_eq!(pattern, PathPattern::Prefix("/mint".into()));

        assert!(pattern.matches("/mint"));
        assert!(pattern.matches("/mint/"));
        assert!(pattern.matches("/mint/123/details"));
        assert!(!pattern.matches("/mintage"));
        assert!(!pattern.matches("/api/mint"));
    }

    #[test]
    fn test_root_wildcard_matches_everything() {
        let pattern = PathPattern::parse("/*");
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
    }

    #[test]
    fn test_display_round_trips_source() {
        for source in ["/user/*", "/wallet/session"] {
            assert_eq!(PathPattern::parse(source).to_string(), source);
        }
    }
}
