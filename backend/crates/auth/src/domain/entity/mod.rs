//! Entities owned by the access-control boundary

pub mod auth_state;
pub mod user;

pub use auth_state::{AuthPhase, AuthState};
pub use user::UserSummary;
