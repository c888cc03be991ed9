//! Edge Middleware
//!
//! Runs in front of the page routes and applies [`decide`] to every request.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

use platform::cookie::has_cookie;

use crate::application::config::AuthConfig;
use crate::application::edge_gate::{EdgeDecision, decide};

/// Redirect or pass through based on the route table and the
/// session-presence cookie.
///
/// Install with `axum::middleware::from_fn_with_state(config, edge_guard)`.
pub async fn edge_guard(
    State(config): State<Arc<AuthConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let has_session = has_cookie(req.headers(), &config.session_cookie_name);

    match decide(&config, &path, has_session) {
        EdgeDecision::Bypass | EdgeDecision::PassThrough => next.run(req).await,
        EdgeDecision::Redirect(location) => {
            tracing::debug!(path = %path, has_session, location = %location, "Edge redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}
