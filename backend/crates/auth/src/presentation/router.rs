//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::Authenticator;
use crate::infra::http::HttpAuthenticator;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router backed by the upstream identity provider
pub fn auth_router(authenticator: HttpAuthenticator, config: Arc<AuthConfig>) -> Router {
    auth_router_generic(authenticator, config)
}

/// Create a generic Auth router for any authenticator implementation
pub fn auth_router_generic<A>(authenticator: A, config: Arc<AuthConfig>) -> Router
where
    A: Authenticator + Send + Sync + 'static,
{
    let state = AuthAppState {
        authenticator: Arc::new(authenticator),
        config,
    };

    Router::new()
        .route("/login", post(handlers::login::<A>))
        .route("/logout", post(handlers::logout::<A>))
        .route("/me", get(handlers::me::<A>))
        .route("/refresh", post(handlers::refresh::<A>))
        .with_state(state)
}
