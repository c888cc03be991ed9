//! Edge Gate
//!
//! The routing decision made before any page is served. It only knows
//! whether a session-presence cookie exists, so it answers "may a session
//! exist", never "does this session hold role R". Role checks happen in the
//! guards and in the API behind the cookie.

use crate::application::config::{AuthConfig, UnmatchedRoutePolicy};
use crate::domain::route_table::{RouteClass, normalize_path};

/// What to do with one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Infrastructure path, not inspected at all.
    Bypass,
    /// Serve the request unchanged.
    PassThrough,
    /// Send the visitor elsewhere.
    Redirect(String),
}

/// Decide the fate of a request for `path`.
///
/// `path` is the raw request path without query string. The login redirect
/// carries it verbatim (percent-encoded) as the `redirect` parameter.
pub fn decide(config: &AuthConfig, path: &str, has_session: bool) -> EdgeDecision {
    let normalized = normalize_path(path);

    if is_bypassed(config, &normalized) {
        return EdgeDecision::Bypass;
    }

    match config.route_table.classify_normalized(&normalized) {
        RouteClass::Public { auth_page: true } if has_session => {
            EdgeDecision::Redirect(config.landing_path.clone())
        }
        RouteClass::Public { .. } => EdgeDecision::PassThrough,
        RouteClass::Protected(_) if !has_session => login_redirect(config, path),
        RouteClass::Protected(_) => EdgeDecision::PassThrough,
        RouteClass::Unclassified => match config.unmatched_policy {
            UnmatchedRoutePolicy::FailClosed if !has_session => login_redirect(config, path),
            UnmatchedRoutePolicy::FailClosed | UnmatchedRoutePolicy::FailOpen => {
                EdgeDecision::PassThrough
            }
        },
    }
}

fn login_redirect(config: &AuthConfig, path: &str) -> EdgeDecision {
    EdgeDecision::Redirect(format!(
        "{}?redirect={}",
        config.login_path,
        urlencoding::encode(path)
    ))
}

fn is_bypassed(config: &AuthConfig, path: &str) -> bool {
    config.bypass_prefixes.iter().any(|prefix| {
        path.strip_prefix(prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
