//! Auth State Entity
//!
//! Lifecycle of "who is the current user" inside one mounted client:
//!
//! ```text
//! Uninitialized --init--> Loading --identity resolved--> Authenticated(user)
//!                                  \--failed / no user--> Anonymous
//! ```
//!
//! `login`/`logout` move directly to `Authenticated`/`Anonymous`.

use serde::Serialize;

use crate::domain::entity::user::UserSummary;
use crate::domain::value_object::user_role::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Uninitialized,
    Loading,
    Authenticated(UserSummary),
    Anonymous,
}

impl AuthPhase {
    /// The identity check has not settled yet.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, AuthPhase::Uninitialized | AuthPhase::Loading)
    }
}

/// Read-only snapshot handed to guards and display code.
///
/// `is_authenticated == user.is_some()` holds for every snapshot. While
/// pending, `user` is always `None`, so a stale user from before a reset is
/// never observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<UserSummary>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthState {
    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn loading() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: false,
        }
    }

    pub fn authenticated(user: UserSummary) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        }
    }
}

impl From<&AuthPhase> for AuthState {
    fn from(phase: &AuthPhase) -> Self {
        match phase {
            AuthPhase::Uninitialized | AuthPhase::Loading => AuthState::loading(),
            AuthPhase::Authenticated(user) => AuthState::authenticated(user.clone()),
            AuthPhase::Anonymous => AuthState::anonymous(),
        }
    }
}
