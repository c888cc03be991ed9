//! Domain Layer
//!
//! Roles, the user summary, auth state, the route table, and the
//! collaborator traits the boundary depends on.

pub mod entity;
pub mod repository;
pub mod route_table;
pub mod value_object;

// Re-exports
pub use entity::{AuthPhase, AuthState, UserSummary};
pub use repository::{Authenticator, Credentials, IdentityCheck, IssuedSession};
pub use route_table::{RouteClass, RouteTable, normalize_path};
pub use value_object::{RoleSet, UserRole};
