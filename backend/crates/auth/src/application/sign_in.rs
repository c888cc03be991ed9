//! Sign In Use Case
//!
//! Exchanges credentials for a session at the identity provider.

use std::sync::Arc;

use crate::domain::repository::{Authenticator, Credentials, IssuedSession};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<A>
where
    A: Authenticator,
{
    authenticator: Arc<A>,
}

impl<A> SignInUseCase<A>
where
    A: Authenticator,
{
    pub fn new(authenticator: Arc<A>) -> Self {
        Self { authenticator }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<IssuedSession> {
        let email = input.email.trim();

        // Blank input never reaches the provider; same answer as a wrong password.
        if email.is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let credentials = Credentials {
            email: email.to_string(),
            password: input.password,
        };

        let session = self.authenticator.login(&credentials).await?;

        tracing::info!(
            user_id = %session.user.id,
            role = %session.user.role,
            expires_at = %session.expires_at,
            "User signed in"
        );

        Ok(session)
    }
}
