//! Refresh Session Use Case
//!
//! Rotates the refresh token.

use std::sync::Arc;

use crate::domain::repository::{Authenticator, IssuedSession};
use crate::error::{AuthError, AuthResult};

pub struct RefreshSessionUseCase<A>
where
    A: Authenticator,
{
    authenticator: Arc<A>,
}

impl<A> RefreshSessionUseCase<A>
where
    A: Authenticator,
{
    pub fn new(authenticator: Arc<A>) -> Self {
        Self { authenticator }
    }

    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<IssuedSession> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::SessionInvalid)?;

        let session = self.authenticator.refresh(token).await?;
        tracing::debug!(user_id = %session.user.id, "Refresh token rotated");

        Ok(session)
    }
}
