//! Sign Out Use Case
//!
//! Revokes the refresh token at the identity provider. Revocation is best
//! effort: the caller clears the cookies whatever happens here.

use std::sync::Arc;

use crate::domain::repository::Authenticator;

/// Sign out use case
pub struct SignOutUseCase<A>
where
    A: Authenticator,
{
    authenticator: Arc<A>,
}

impl<A> SignOutUseCase<A>
where
    A: Authenticator,
{
    pub fn new(authenticator: Arc<A>) -> Self {
        Self { authenticator }
    }

    /// Returns whether the provider confirmed the revocation.
    pub async fn execute(&self, refresh_token: Option<&str>) -> bool {
        let Some(token) = refresh_token.filter(|t| !t.is_empty()) else {
            return false;
        };

        match self.authenticator.logout(token).await {
            Ok(()) => {
                tracing::info!("User signed out");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh token revocation failed, clearing cookies anyway");
                false
            }
        }
    }
}
