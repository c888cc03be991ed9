//! Application Layer
//!
//! Edge decisions, the client auth store, guards, and the auth API use cases.

pub mod auth_store;
pub mod check_session;
pub mod config;
pub mod edge_gate;
pub mod guard;
pub mod refresh_session;
pub mod sign_in;
pub mod sign_out;

// Re-exports
pub use auth_store::AuthStore;
pub use check_session::CheckSessionUseCase;
pub use config::{AuthConfig, UnmatchedRoutePolicy};
pub use edge_gate::{EdgeDecision, decide};
pub use guard::{AuthGuard, Both, DenialReason, Gated, Guard, GuardOutcome, RoleGuard};
pub use refresh_session::RefreshSessionUseCase;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
