//! Auth / Role Guards
//!
//! Client-side predicates deciding whether a protected view may render.
//! They suppress UI only. The edge middleware and the API stay
//! authoritative for what a visitor can reach, so a guard never grants
//! anything those layers would refuse.
//!
//! While the auth state is still loading every guard answers
//! [`GuardOutcome::Loading`], never a denial, so identity resolution does
//! not flash an access-denied view.

use std::fmt;

use crate::domain::entity::auth_state::AuthState;
use crate::domain::value_object::user_role::{RoleSet, UserRole};

/// Why a guard refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    Unauthenticated,
    InsufficientRole,
}

impl DenialReason {
    /// Reason code carried in the `reason` query parameter.
    pub const fn code(&self) -> &'static str {
        match self {
            DenialReason::Unauthenticated => "unauthenticated",
            DenialReason::InsufficientRole => "insufficient_role",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    Loading,
    /// Render the fallback, or the default access-denied view.
    Denied(DenialReason),
    /// Navigate client-side to a neutral page.
    Redirect { to: String, reason: DenialReason },
}

/// What a guarded subtree turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    Content(T),
    Loading,
    Fallback(T),
    AccessDenied(DenialReason),
    Navigate { to: String, reason: DenialReason },
}

pub trait Guard {
    fn check(&self, state: &AuthState) -> GuardOutcome;

    /// Nest `inner` inside `self`. Both must pass.
    fn and<G>(self, inner: G) -> Both<Self, G>
    where
        Self: Sized,
        G: Guard,
    {
        Both {
            outer: self,
            inner,
        }
    }

    /// Build the children only when the guard passes.
    fn gate<T>(&self, state: &AuthState, children: impl FnOnce() -> T) -> Gated<T> {
        match self.check(state) {
            GuardOutcome::Render => Gated::Content(children()),
            GuardOutcome::Loading => Gated::Loading,
            GuardOutcome::Denied(reason) => Gated::AccessDenied(reason),
            GuardOutcome::Redirect { to, reason } => Gated::Navigate { to, reason },
        }
    }

    /// Like [`Guard::gate`], with a fallback replacing the access-denied view.
    fn gate_or<T>(
        &self,
        state: &AuthState,
        children: impl FnOnce() -> T,
        fallback: impl FnOnce() -> T,
    ) -> Gated<T> {
        match self.gate(state, children) {
            Gated::AccessDenied(_) => Gated::Fallback(fallback()),
            other => other,
        }
    }
}

/// `requireAuth` / `requiredRole` guard.
///
/// A missing session is a denial. A wrong role navigates to the neutral
/// unauthorized page with `?reason=insufficient_role`.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    require_auth: bool,
    required_role: Option<UserRole>,
    unauthorized_path: String,
}

impl AuthGuard {
    pub fn new(unauthorized_path: impl Into<String>) -> Self {
        Self {
            require_auth: true,
            required_role: None,
            unauthorized_path: unauthorized_path.into(),
        }
    }

    pub fn require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    /// A required role implies a required session.
    pub fn required_role(mut self, role: UserRole) -> Self {
        self.required_role = Some(role);
        self
    }
}

impl Guard for AuthGuard {
    fn check(&self, state: &AuthState) -> GuardOutcome {
        if state.is_loading {
            return GuardOutcome::Loading;
        }

        let needs_session = self.require_auth || self.required_role.is_some();
        let Some(user) = state.user.as_ref() else {
            return if needs_session {
                GuardOutcome::Denied(DenialReason::Unauthenticated)
            } else {
                GuardOutcome::Render
            };
        };

        match self.required_role {
            Some(role) if !user.has_role(role) => {
                let reason = DenialReason::InsufficientRole;
                GuardOutcome::Redirect {
                    to: format!("{}?reason={}", self.unauthorized_path, reason.code()),
                    reason,
                }
            }
            _ => GuardOutcome::Render,
        }
    }
}

/// Allow-list guard: the user's role must be one of `allowed`.
#[derive(Debug, Clone, Copy)]
pub struct RoleGuard {
    allowed: RoleSet,
}

impl RoleGuard {
    pub fn new(allowed: impl Into<RoleSet>) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    pub fn allowing(roles: &[UserRole]) -> Self {
        Self::new(RoleSet::of(roles))
    }
}

impl Guard for RoleGuard {
    fn check(&self, state: &AuthState) -> GuardOutcome {
        if state.is_loading {
            return GuardOutcome::Loading;
        }

        match state.role() {
            None => GuardOutcome::Denied(DenialReason::Unauthenticated),
            Some(role) if self.allowed.contains(role) => GuardOutcome::Render,
            Some(_) => GuardOutcome::Denied(DenialReason::InsufficientRole),
        }
    }
}

/// Two nested guards; the outer one is consulted first.
#[derive(Debug, Clone)]
pub struct Both<A, B> {
    outer: A,
    inner: B,
}

impl<A: Guard, B: Guard> Guard for Both<A, B> {
    fn check(&self, state: &AuthState) -> GuardOutcome {
        match self.outer.check(state) {
            GuardOutcome::Render => self.inner.check(state),
            blocked => blocked,
        }
    }
}

impl<G: Guard + ?Sized> Guard for &G {
    fn check(&self, state: &AuthState) -> GuardOutcome {
        (**self).check(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::UserSummary;
    use UserRole::{Admin, User};

    fn signed_in(role: UserRole) -> AuthState {
        AuthState::authenticated(UserSummary {
            id: format!("{role}-1"),
            email: format!("{role}@example.com"),
            display_name: None,
            role,
        })
    }

    #[test]
    fn test_role_guard_nesting_is_logical_and() {
        let admin_only = RoleGuard::allowing(&[Admin]).and(RoleGuard::allowing(&[Admin, User]));
        assert_eq!(
            admin_only.check(&signed_in(User)),
            GuardOutcome::Denied(DenialReason::InsufficientRole)
        );

        let either = RoleGuard::allowing(&[Admin, User]).and(RoleGuard::allowing(&[Admin, User]));
        assert_eq!(either.check(&signed_in(Admin)), GuardOutcome::Render);
    }

    #[test]
    fn test_inner_restriction_also_applies() {
        let guard = RoleGuard::allowing(&[Admin, User]).and(RoleGuard::allowing(&[Admin]));
        assert_eq!(
            guard.check(&signed_in(User)),
            GuardOutcome::Denied(DenialReason::InsufficientRole)
        );
        assert_eq!(guard.check(&signed_in(Admin)), GuardOutcome::Render);
    }

    #[test]
    fn test_loading_never_denies() {
        let loading = AuthState::loading();
        assert_eq!(
            RoleGuard::allowing(&[Admin]).check(&loading),
            GuardOutcome::Loading
        );
        assert_eq!(
            AuthGuard::new("/unauthorized")
                .required_role(Admin)
                .check(&loading),
            GuardOutcome::Loading
        );
        assert_eq!(
            RoleGuard::allowing(&[Admin])
                .and(AuthGuard::new("/unauthorized"))
                .check(&loading),
            GuardOutcome::Loading
        );

        let view = RoleGuard::allowing(&[Admin]).gate(&loading, || "ledger");
        assert_eq!(view, Gated::Loading);
    }

    #[test]
    fn test_auth_guard_requires_session() {
        let guard = AuthGuard::new("/unauthorized");
        assert_eq!(
            guard.check(&AuthState::anonymous()),
            GuardOutcome::Denied(DenialReason::Unauthenticated)
        );
        assert_eq!(guard.check(&signed_in(User)), GuardOutcome::Render);

        let open = AuthGuard::new("/unauthorized").require_auth(false);
        assert_eq!(open.check(&AuthState::anonymous()), GuardOutcome::Render);
    }

    #[test]
    fn test_auth_guard_role_mismatch_navigates_with_reason() {
        let guard = AuthGuard::new("/unauthorized").required_role(Admin);
        assert_eq!(
            guard.check(&signed_in(User)),
            GuardOutcome::Redirect {
                to: "/unauthorized?reason=insufficient_role".to_string(),
                reason: DenialReason::InsufficientRole,
            }
        );
        assert_eq!(guard.check(&signed_in(Admin)), GuardOutcome::Render);
    }

    #[test]
    fn test_required_role_implies_session() {
        let guard = AuthGuard::new("/unauthorized")
            .require_auth(false)
            .required_role(Admin);
        assert_eq!(
            guard.check(&AuthState::anonymous()),
            GuardOutcome::Denied(DenialReason::Unauthenticated)
        );
    }

    #[test]
    fn test_gate_builds_children_only_when_allowed() {
        let guard = RoleGuard::allowing(&[Admin]);
        let mut built = false;

        let view = guard.gate(&signed_in(User), || {
            built = true;
            "audit log"
        });
        assert_eq!(view, Gated::AccessDenied(DenialReason::InsufficientRole));
        assert!(!built);

        assert_eq!(
            guard.gate(&signed_in(Admin), || "audit log"),
            Gated::Content("audit log")
        );
    }

    #[test]
    fn test_gate_or_uses_fallback() {
        let view = RoleGuard::allowing(&[Admin]).gate_or(
            &AuthState::anonymous(),
            || "audit log",
            || "please sign in",
        );
        assert_eq!(view, Gated::Fallback("please sign in"));
    }

    #[test]
    fn test_guard_by_reference() {
        let guard = RoleGuard::allowing(&[User]);
        let nested = (&guard).and(&guard);
        assert_eq!(nested.check(&signed_in(User)), GuardOutcome::Render);
    }
}
