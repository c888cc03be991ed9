//! Check Session Use Case
//!
//! Resolves the refresh-token cookie to the current user.

use std::sync::Arc;

use crate::domain::entity::user::UserSummary;
use crate::domain::repository::Authenticator;
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<A>
where
    A: Authenticator,
{
    authenticator: Arc<A>,
}

impl<A> CheckSessionUseCase<A>
where
    A: Authenticator,
{
    pub fn new(authenticator: Arc<A>) -> Self {
        Self { authenticator }
    }

    /// The user behind `refresh_token`, or `SessionInvalid`.
    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<UserSummary> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::SessionInvalid)?;

        self.authenticator
            .current_user(token)
            .await?
            .ok_or(AuthError::SessionInvalid)
    }
}
