//! Auth (Access Control) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Roles, user summary, auth state, route table, collaborator traits
//! - `application/` - Edge decision, auth store, guards, use cases
//! - `infra/` - HTTP clients for the identity provider
//! - `presentation/` - HTTP handlers, DTOs, router, edge middleware
//!
//! ## Features
//! - Route classification (public, auth page, protected by role set)
//! - Edge redirects driven by a session-presence cookie
//! - Refresh-token cookie scoped to the auth API path
//! - Client auth store with cancellable identity check
//! - Composable auth / role guards
//!
//! ## Security Model
//! - Credentials and tokens are verified by the identity provider only
//! - The edge sees cookie presence, never roles
//! - Guards suppress UI; the API stays authoritative

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AuthConfig, UnmatchedRoutePolicy};
pub use error::{AuthError, AuthResult, IdentityError};
pub use infra::http::{HttpAuthenticator, HttpIdentityCheck};
pub use presentation::middleware::edge_guard;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::application::auth_store::AuthStore;
}

pub mod guard {
    pub use crate::application::guard::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
