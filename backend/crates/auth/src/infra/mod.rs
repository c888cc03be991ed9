//! Infrastructure Layer
//!
//! HTTP implementations of the collaborator traits.

pub mod http;

pub use self::http::{HttpAuthenticator, HttpIdentityCheck};
