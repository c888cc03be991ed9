//! Application Configuration
//!
//! Configuration for the access-control boundary.

use platform::cookie::CookiePolicy;
use platform::environment::Environment;

use crate::domain::route_table::RouteTable;
use crate::error::AuthResult;

/// What the edge does with a path the route table does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedRoutePolicy {
    /// Pass through. New protected pages are public until added to the table.
    #[default]
    FailOpen,
    /// Treat as protected for any role: no session means redirect to login.
    FailClosed,
}

impl UnmatchedRoutePolicy {
    /// Parse `open` / `closed`.
    pub fn from_setting(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" | "fail-open" => Some(Self::FailOpen),
            "closed" | "fail-closed" => Some(Self::FailClosed),
            _ => None,
        }
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Cookie attributes per environment
    pub cookie_policy: CookiePolicy,
    /// Refresh-token cookie name (scoped to the auth API path)
    pub refresh_cookie_name: String,
    /// Session-presence cookie name (checked by the edge middleware)
    pub session_cookie_name: String,
    /// Frontend route classification
    pub route_table: RouteTable,
    /// Handling of paths missing from the route table
    pub unmatched_policy: UnmatchedRoutePolicy,
    /// Where unauthenticated visitors of protected pages are sent
    pub login_path: String,
    /// Where authenticated visitors of auth pages are sent
    pub landing_path: String,
    /// Neutral page for role mismatches, reached with `?reason=<code>`
    pub unauthorized_path: String,
    /// Prefixes the edge middleware never inspects
    pub bypass_prefixes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AuthConfig {
    /// Development config (insecure, host-only cookies)
    pub fn development() -> Self {
        Self::with_cookie_policy(CookiePolicy::development())
    }

    /// Production config (Secure, SameSite=None, domain-scoped cookies)
    pub fn production(cookie_domain: impl Into<String>) -> Self {
        Self::with_cookie_policy(CookiePolicy::production(cookie_domain))
    }

    /// Config for `environment`; production requires a cookie domain.
    pub fn for_environment(
        environment: Environment,
        cookie_domain: Option<&str>,
    ) -> AuthResult<Self> {
        let policy = CookiePolicy::for_environment(environment, cookie_domain)?;
        Ok(Self::with_cookie_policy(policy))
    }

    fn with_cookie_policy(cookie_policy: CookiePolicy) -> Self {
        Self {
            cookie_policy,
            refresh_cookie_name: "refreshToken".to_string(),
            session_cookie_name: "session".to_string(),
            route_table: RouteTable::standard(),
            unmatched_policy: UnmatchedRoutePolicy::default(),
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
            unauthorized_path: "/unauthorized".to_string(),
            bypass_prefixes: ["/api", "/_next/static", "/_next/image", "/favicon.ico"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn with_unmatched_policy(mut self, policy: UnmatchedRoutePolicy) -> Self {
        self.unmatched_policy = policy;
        self
    }

    pub fn with_route_table(mut self, route_table: RouteTable) -> Self {
        self.route_table = route_table;
        self
    }

    pub fn environment(&self) -> Environment {
        self.cookie_policy.environment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_policy_from_setting() {
        assert_eq!(
            UnmatchedRoutePolicy::from_setting("open"),
            Some(UnmatchedRoutePolicy::FailOpen)
        );
        assert_eq!(
            UnmatchedRoutePolicy::from_setting(" Closed "),
            Some(UnmatchedRoutePolicy::FailClosed)
        );
        assert_eq!(UnmatchedRoutePolicy::from_setting("maybe"), None);
    }

    #[test]
    fn test_for_environment() {
        let config = AuthConfig::for_environment(Environment::Production, Some("example.com"))
            .unwrap();
        assert!(config.environment().is_production());

        assert!(AuthConfig::for_environment(Environment::Production, None).is_err());
        assert!(
            !AuthConfig::for_environment(Environment::Development, None)
                .unwrap()
                .environment()
                .is_production()
        );
    }

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.unmatched_policy, UnmatchedRoutePolicy::FailOpen);
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.landing_path, "/dashboard");
        assert!(config.bypass_prefixes.iter().any(|p| p == "/api"));
    }
}
