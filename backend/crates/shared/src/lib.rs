//! Shared Kernel - vocabulary shared by every crate in the gateway
//!
//! Only the error model lives here:
//! - [`error::kind::ErrorKind`] classifies failures and maps them to HTTP status codes
//! - [`error::app_error::AppError`] carries a message, an optional user action and a source
//! - with the `axum` feature, `AppError` renders as an RFC 7807 problem document

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}

pub use error::app_error::{AppError, AppResult};
pub use error::kind::ErrorKind;
