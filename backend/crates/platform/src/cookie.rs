//! Cookie Management Infrastructure
//!
//! Attribute policy for the two auth cookies and the header plumbing around
//! them.
//!
//! The refresh-token cookie is scoped to [`REFRESH_TOKEN_PATH`] so browsers
//! only send it to the auth API. The session-presence cookie lives at `/` so
//! the edge middleware can observe it on page requests. Each clear variant
//! is derived from the same base as its issuance variant; a clear with a
//! different `Path` than the issuance never removes the cookie.

use http::{HeaderMap, HeaderValue, header};
use chrono::{DateTime, Utc};

use crate::environment::Environment;

/// Path the refresh-token cookie is scoped to.
pub const REFRESH_TOKEN_PATH: &str = "/api/v1/auth";

/// Path of the session-presence cookie.
pub const SESSION_PRESENCE_PATH: &str = "/";

const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes of an auth cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub path: &'static str,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub same_site: SameSite,
    pub domain: Option<String>,
}

impl CookieOptions {
    /// Build the `Set-Cookie` value that stores `value` under `name`.
    pub fn build_set_cookie(&self, name: &str, value: &str) -> String {
        let mut cookie = format!("{name}={value}");
        self.push_attributes(&mut cookie);

        if let Some(expires) = self.expires {
            cookie.push_str("; Expires=");
            cookie.push_str(&http_date(expires));
        }

        cookie
    }

    /// Build the `Set-Cookie` value that removes `name`.
    ///
    /// Any `expires` on `self` is ignored: the clear is always an epoch
    /// `Expires` plus `Max-Age=0`.
    pub fn build_delete_cookie(&self, name: &str) -> String {
        let mut cookie = format!("{name}=");
        self.push_attributes(&mut cookie);
        cookie.push_str("; Max-Age=0; Expires=");
        cookie.push_str(EPOCH_HTTP_DATE);
        cookie
    }

    fn push_attributes(&self, cookie: &mut String) {
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=");
        cookie.push_str(self.same_site.as_str());
        cookie.push_str("; Path=");
        cookie.push_str(self.path);
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
    }
}

/// Error building a [`CookiePolicy`] or a cookie header.
#[derive(Debug, thiserror::Error)]
pub enum CookiePolicyError {
    #[error("a cookie domain is required in production")]
    MissingProductionDomain,

    #[error("cookie value is not a valid header value")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}

/// Environment-driven cookie attribute policy.
///
/// Production cookies are `Secure; SameSite=None` and carry the production
/// domain, so the frontend and API hosts can share them. Development cookies
/// are `SameSite=Lax`, not `Secure`, and host-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    environment: Environment,
    production_domain: Option<String>,
}

impl CookiePolicy {
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            production_domain: None,
        }
    }

    pub fn production(domain: impl Into<String>) -> Self {
        Self {
            environment: Environment::Production,
            production_domain: Some(domain.into()),
        }
    }

    /// Select the policy for `environment`.
    ///
    /// The domain is ignored outside production and mandatory inside it.
    pub fn for_environment(
        environment: Environment,
        domain: Option<&str>,
    ) -> Result<Self, CookiePolicyError> {
        match environment {
            Environment::Development => Ok(Self::development()),
            Environment::Production => domain
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(Self::production)
                .ok_or(CookiePolicyError::MissingProductionDomain),
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Options for issuing the refresh-token cookie.
    pub fn refresh_token(&self, expires: DateTime<Utc>) -> CookieOptions {
        CookieOptions {
            expires: Some(expires),
            ..self.base(REFRESH_TOKEN_PATH)
        }
    }

    /// Options for clearing the refresh-token cookie.
    pub fn clear_refresh_token(&self) -> CookieOptions {
        self.base(REFRESH_TOKEN_PATH)
    }

    /// Options for issuing the session-presence cookie.
    pub fn session_presence(&self, expires: DateTime<Utc>) -> CookieOptions {
        CookieOptions {
            expires: Some(expires),
            ..self.base(SESSION_PRESENCE_PATH)
        }
    }

    /// Options for clearing the session-presence cookie.
    pub fn clear_session_presence(&self) -> CookieOptions {
        self.base(SESSION_PRESENCE_PATH)
    }

    fn base(&self, path: &'static str) -> CookieOptions {
        if self.environment.is_production() {
            CookieOptions {
                http_only: true,
                path,
                expires: None,
                secure: true,
                same_site: SameSite::None,
                domain: self.production_domain.clone(),
            }
        } else {
            CookieOptions {
                http_only: true,
                path,
                expires: None,
                secure: false,
                same_site: SameSite::Lax,
                domain: None,
            }
        }
    }
}

/// Render an instant as an IMF-fixdate (RFC 9110 §5.6.7).
pub fn http_date(instant: DateTime<Utc>) -> String {
    instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Extract a cookie value from headers
///
/// Every `Cookie` header is searched, since HTTP/2 clients may split the
/// cookie list across several of them.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key.trim() == name {
                Some(value.trim().to_string())
            } else {
                None
            }
        })
}

/// Whether a non-empty cookie named `name` was sent.
///
/// Only presence is checked, the value is opaque here.
pub fn has_cookie(headers: &HeaderMap, name: &str) -> bool {
    extract_cookie(headers, name).is_some_and(|value| !value.is_empty())
}

/// `Set-Cookie` header storing `value` under `name`.
pub fn set_cookie_header(
    options: &CookieOptions,
    name: &str,
    value: &str,
) -> Result<HeaderValue, CookiePolicyError> {
    Ok(HeaderValue::from_str(&options.build_set_cookie(name, value))?)
}

/// `Set-Cookie` header removing `name`.
pub fn delete_cookie_header(
    options: &CookieOptions,
    name: &str,
) -> Result<HeaderValue, CookiePolicyError> {
    Ok(HeaderValue::from_str(&options.build_delete_cookie(name))?)
}
