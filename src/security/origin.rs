//! Origin and return-URL allow-listing.

use crate::config::{DeploymentMode, SecurityConfig};

/// Checks request origins and post-connect redirect targets.
#[derive(Debug, Clone)]
pub struct OriginGuard {
    allowed_origins: Vec<String>,
    return_prefixes: Vec<String>,
    default_return_url: String,
}

impl OriginGuard {
    pub fn new(
        allowed_origins: Vec<String>,
        return_prefixes: Vec<String>,
        default_return_url: impl Into<String>,
    ) -> Self {
        Self {
            allowed_origins,
            return_prefixes,
            default_return_url: default_return_url.into(),
        }
    }

    /// Build from config; local development origins only outside production.
    pub fn from_config(security: &SecurityConfig, mode: DeploymentMode) -> Self {
        let mut origins = security.allowed_origins.clone();
        if !mode.is_production() {
            origins.extend(security.dev_origins.iter().cloned());
        }
        Self::new(
            origins,
            security.allowed_return_prefixes.clone(),
            security.default_return_url.clone(),
        )
    }

    /// Exact match against the allow-list.
    pub fn validate_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// The candidate when it is under an allowed prefix, else the site root.
    pub fn sanitize_return_url(&self, candidate: Option<&str>) -> String {
        match candidate {
            Some(candidate) => {
                sanitize_return_url(candidate, &self.return_prefixes, &self.default_return_url)
            }
            None => self.default_return_url.clone(),
        }
    }

    pub fn default_return_url(&self) -> &str {
        &self.default_return_url
    }
}

/// Return `candidate` if it starts with one of `allowed_prefixes`, otherwise
/// `default`.
///
/// A prefix must end at a URL boundary, so `https://site.example` does not
/// admit `https://site.example.evil.test`.
pub fn sanitize_return_url(candidate: &str, allowed_prefixes: &[String], default: &str) -> String {
    if candidate
        .chars()
        .any(|c| c.is_control() || c.is_whitespace() || c == '\\')
    {
        return default.to_string();
    }

    let allowed = allowed_prefixes.iter().any(|prefix| {
        candidate.strip_prefix(prefix.as_str()).is_some_and(|rest| {
            prefix.ends_with('/')
                || rest.is_empty()
                || rest.starts_with(['/', '?', '#'])
        })
    });

    if allowed {
        candidate.to_string()
    } else {
        default.to_string()
    }
}
