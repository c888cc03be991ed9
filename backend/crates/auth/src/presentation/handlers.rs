//! HTTP Handlers
//!
//! Every response that starts or ends a session writes both auth cookies
//! with the same attributes, so the edge presence check never disagrees
//! with the refresh token.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Response};
use std::sync::Arc;

use kernel::error::app_error::AppError;
use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};

use crate::application::config::AuthConfig;
use crate::application::{
    CheckSessionUseCase, RefreshSessionUseCase, SignInInput, SignInUseCase, SignOutUseCase,
};
use crate::domain::repository::{Authenticator, IssuedSession};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{LoginRequest, SessionResponse, UserResponse};

/// Value of the session-presence cookie. Only its presence matters.
const SESSION_PRESENCE_VALUE: &str = "1";

/// Shared state for auth handlers
pub struct AuthAppState<A>
where
    A: Authenticator + Send + Sync + 'static,
{
    pub authenticator: Arc<A>,
    pub config: Arc<AuthConfig>,
}

impl<A> Clone for AuthAppState<A>
where
    A: Authenticator + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            authenticator: self.authenticator.clone(),
            config: self.config.clone(),
        }
    }
}

type CookieHeaders = AppendHeaders<[(header::HeaderName, HeaderValue); 2]>;

// ============================================================================
// Login
// ============================================================================

/// POST /api/v1/auth/login
///
/// A body that is not a login request answers 400 problem JSON.
pub async fn login<A>(
    State(state): State<AuthAppState<A>>,
    body: Bytes,
) -> AuthResult<impl IntoResponse>
where
    A: Authenticator + Send + Sync + 'static,
{
    let req: LoginRequest = serde_json::from_slice(&body).map_err(AppError::from)?;

    let use_case = SignInUseCase::new(state.authenticator.clone());

    let session = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    issue_session(&state.config, session)
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/v1/auth/logout
///
/// Always answers 204 and clears both cookies, even when revocation fails.
pub async fn logout<A>(
    State(state): State<AuthAppState<A>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    A: Authenticator + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie_name);

    let use_case = SignOutUseCase::new(state.authenticator.clone());
    use_case.execute(token.as_deref()).await;

    Ok((StatusCode::NO_CONTENT, clear_cookies(&state.config)?))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/v1/auth/me
///
/// An unknown or missing refresh token answers 401 and clears both cookies.
pub async fn me<A>(State(state): State<AuthAppState<A>>, headers: HeaderMap) -> Response
where
    A: Authenticator + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie_name);

    let use_case = CheckSessionUseCase::new(state.authenticator.clone());

    let result = match use_case.execute(token.as_deref()).await {
        Ok(user) => Ok(Json(UserResponse { user }).into_response()),
        Err(AuthError::SessionInvalid) => reject_session(&state.config),
        Err(e) => Err(e),
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/v1/auth/refresh
///
/// A rejected refresh token also clears both cookies.
pub async fn refresh<A>(State(state): State<AuthAppState<A>>, headers: HeaderMap) -> Response
where
    A: Authenticator + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie_name);

    let use_case = RefreshSessionUseCase::new(state.authenticator.clone());

    let result = match use_case.execute(token.as_deref()).await {
        Ok(session) => issue_session(&state.config, session).map(IntoResponse::into_response),
        Err(AuthError::SessionInvalid) => reject_session(&state.config),
        Err(e) => Err(e),
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn issue_session(
    config: &AuthConfig,
    session: IssuedSession,
) -> AuthResult<(CookieHeaders, Json<SessionResponse>)> {
    let policy = &config.cookie_policy;

    let refresh = set_cookie_header(
        &policy.refresh_token(session.expires_at),
        &config.refresh_cookie_name,
        &session.refresh_token,
    )?;
    let presence = set_cookie_header(
        &policy.session_presence(session.expires_at),
        &config.session_cookie_name,
        SESSION_PRESENCE_VALUE,
    )?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, refresh), (header::SET_COOKIE, presence)]),
        Json(SessionResponse {
            user: session.user,
            expires_at: session.expires_at,
        }),
    ))
}

/// 401 that also drops the cookies, so the edge stops treating the visitor
/// as signed in.
fn reject_session(config: &AuthConfig) -> AuthResult<Response> {
    clear_cookies(config).map(|cleared| (cleared, AuthError::SessionInvalid).into_response())
}

fn clear_cookies(config: &AuthConfig) -> AuthResult<CookieHeaders> {
    let policy = &config.cookie_policy;

    let refresh = delete_cookie_header(&policy.clear_refresh_token(), &config.refresh_cookie_name)?;
    let presence = delete_cookie_header(
        &policy.clear_session_presence(),
        &config.session_cookie_name,
    )?;

    Ok(AppendHeaders([
        (header::SET_COOKIE, refresh),
        (header::SET_COOKIE, presence),
    ]))
}
