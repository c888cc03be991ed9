//! Collaborator Traits
//!
//! The boundary never verifies credentials or tokens itself. These traits
//! are the seams to the identity provider that does. HTTP implementations
//! live in the infrastructure layer.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::entity::user::UserSummary;
use crate::error::{AuthResult, IdentityError};

/// Login credentials as submitted by the login form.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A session handed out by the identity provider.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: UserSummary,
    /// Opaque refresh token, stored in the refresh-token cookie.
    pub refresh_token: String,
    /// Expiry of the refresh token; both auth cookies expire with it.
    pub expires_at: DateTime<Utc>,
}

/// Server-side identity provider used by the auth API.
#[trait_variant::make(Authenticator: Send)]
pub trait LocalAuthenticator {
    /// Exchange credentials for a session.
    async fn login(&self, credentials: &Credentials) -> AuthResult<IssuedSession>;

    /// Resolve a refresh token to its user. `None` means the token is not
    /// (or no longer) valid.
    async fn current_user(&self, refresh_token: &str) -> AuthResult<Option<UserSummary>>;

    /// Rotate a refresh token.
    async fn refresh(&self, refresh_token: &str) -> AuthResult<IssuedSession>;

    /// Revoke a refresh token.
    async fn logout(&self, refresh_token: &str) -> AuthResult<()>;
}

/// "Who am I" check used by the client auth store.
#[trait_variant::make(IdentityCheck: Send)]
pub trait LocalIdentityCheck {
    /// `Ok(None)` is the normal unauthenticated answer.
    async fn current_user(&self) -> Result<Option<UserSummary>, IdentityError>;
}
