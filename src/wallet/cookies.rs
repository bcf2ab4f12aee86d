//! Session and CSRF cookie rendering and parsing.

use axum::http::{header, HeaderMap};
use std::fmt::Write as _;

use crate::config::{DeploymentMode, SecurityConfig};

/// HTTP-only cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "wallet_session";

/// Script-readable cookie holding the CSRF token.
pub const CSRF_COOKIE: &str = "csrf_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

/// Attributes shared by both cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
    pub domain: Option<String>,
    pub max_age_secs: u64,
}

impl CookiePolicy {
    /// Production: `Secure`, `SameSite=Strict`, parent domain when configured.
    /// Development: `SameSite=Lax`, host-only, no `Secure`.
    pub fn new(mode: DeploymentMode, security: &SecurityConfig, max_age_secs: u64) -> Self {
        if mode.is_production() {
            Self {
                secure: true,
                same_site: SameSite::Strict,
                domain: security.cookie_domain.clone(),
                max_age_secs,
            }
        } else {
            Self {
                secure: false,
                same_site: SameSite::Lax,
                domain: None,
                max_age_secs,
            }
        }
    }

    pub fn session_cookie(&self, token: &str) -> String {
        self.render(SESSION_COOKIE, token, self.max_age_secs, true)
    }

    pub fn csrf_cookie(&self, token: &str) -> String {
        self.render(CSRF_COOKIE, token, self.max_age_secs, false)
    }

    pub fn clear_session_cookie(&self) -> String {
        self.render(SESSION_COOKIE, "", 0, true)
    }

    pub fn clear_csrf_cookie(&self) -> String {
        self.render(CSRF_COOKIE, "", 0, false)
    }

    fn render(&self, name: &str, value: &str, max_age: u64, http_only: bool) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite={}",
            name,
            value,
            max_age,
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        if http_only {
            cookie.push_str("; HttpOnly");
        }
        if let Some(domain) = &self.domain {
            let _ = write!(cookie, "; Domain={}", domain);
        }
        cookie
    }
}

/// Find a cookie by name across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
