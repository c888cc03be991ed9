//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::cookie::CookiePolicyError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Connection, TLS or timeout failure
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Unexpected HTTP status
    #[error("identity provider answered with status {0}")]
    Status(u16),

    /// Body did not match the expected shape
    #[error("identity provider payload invalid: {0}")]
    Decode(String),
}

impl IdentityError {
    fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::Transport(e) if e.is_timeout() => ErrorKind::GatewayTimeout,
            IdentityError::Transport(_) => ErrorKind::ServiceUnavailable,
            IdentityError::Status(_) | IdentityError::Decode(_) => ErrorKind::BadGateway,
        }
    }

    /// Client-facing error; the cause stays in the logs.
    fn to_app_error(&self) -> AppError {
        const MESSAGE: &str = "Identity provider unavailable";
        match self.kind() {
            ErrorKind::GatewayTimeout => AppError::gateway_timeout(MESSAGE),
            ErrorKind::ServiceUnavailable => AppError::service_unavailable(MESSAGE),
            _ => AppError::bad_gateway(MESSAGE),
        }
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, expired or revoked refresh token
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Role code outside the known set
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Route table failed validation at startup
    #[error("Invalid route table: {0}")]
    InvalidRouteTable(String),

    /// Cookie could not be rendered
    #[error("Cookie error: {0}")]
    Cookie(#[from] CookiePolicyError),

    /// Identity provider failure
    #[error("Identity provider error: {0}")]
    Upstream(#[from] IdentityError),

    /// Rejected request, already classified by the kernel
    #[error(transparent)]
    Request(#[from] AppError),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::UnknownRole(_) => ErrorKind::BadRequest,
            AuthError::Upstream(e) => e.kind(),
            AuthError::Request(e) => e.kind(),
            AuthError::InvalidRouteTable(_) | AuthError::Cookie(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::InvalidCredentials => {
                AppError::unauthorized("Invalid email or password")
                    .with_action("Check your credentials and try again")
            }
            AuthError::SessionInvalid => AppError::unauthorized("Session not found or expired")
                .with_action("Please sign in again"),
            AuthError::Upstream(e) => e.to_app_error(),
            AuthError::InvalidRouteTable(_) | AuthError::Cookie(_) => {
                AppError::internal("Internal error")
            }
            AuthError::UnknownRole(_) => AppError::bad_request(self.to_string()),
            AuthError::Request(e) => {
                let app = AppError::new(e.kind(), e.message().to_string());
                match e.action() {
                    Some(action) => app.with_action(action.to_string()),
                    None => app,
                }
            }
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Upstream(e) => {
                tracing::error!(error = %e, "Identity provider error");
            }
            AuthError::Cookie(e) => {
                tracing::error!(error = %e, "Failed to build auth cookie");
            }
            AuthError::InvalidRouteTable(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Request(e) if e.is_server_error() => {
                tracing::error!(error = %e, "Auth request failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
