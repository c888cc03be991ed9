//! HTTP collaborators
//!
//! `HttpAuthenticator` talks to the upstream identity provider:
//!
//! | Call | Request | Success |
//! |---|---|---|
//! | login | `POST {base}/auth/login` `{email, password}` | `200 {user, refreshToken, expiresAt}` |
//! | current_user | `POST {base}/auth/session` `{refreshToken}` | `200 {user}`, `401` when unknown |
//! | refresh | `POST {base}/auth/refresh` `{refreshToken}` | `200 {user, refreshToken, expiresAt}` |
//! | logout | `POST {base}/auth/logout` `{refreshToken}` | any 2xx |
//!
//! `HttpIdentityCheck` is the client side: it calls this gateway's
//! `GET /api/v1/auth/me` with the refresh-token cookie.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};

use crate::domain::entity::user::UserSummary;
use crate::domain::repository::{Authenticator, Credentials, IdentityCheck, IssuedSession};
use crate::error::{AuthError, AuthResult, IdentityError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenBody<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    user: UserSummary,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl From<SessionPayload> for IssuedSession {
    fn from(payload: SessionPayload) -> Self {
        Self {
            user: payload.user,
            refresh_token: payload.refresh_token,
            expires_at: payload.expires_at,
        }
    }
}

#[derive(Deserialize)]
struct UserPayload {
    user: UserSummary,
}

fn build_client(timeout: Duration) -> Result<Client, IdentityError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, IdentityError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| IdentityError::Decode(e.to_string()))
}

/// Upstream identity provider client.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: Client,
    base_url: String,
}

impl HttpAuthenticator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AuthResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> AuthResult<reqwest::Response> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(IdentityError::from)?;
        Ok(response)
    }

    async fn issued_session(response: reqwest::Response) -> AuthResult<IssuedSession> {
        match response.status() {
            s if s.is_success() => Ok(decode::<SessionPayload>(response).await?.into()),
            StatusCode::UNAUTHORIZED => Err(AuthError::SessionInvalid),
            s => Err(IdentityError::Status(s.as_u16()).into()),
        }
    }
}

impl Authenticator for HttpAuthenticator {
    async fn login(&self, credentials: &Credentials) -> AuthResult<IssuedSession> {
        let body = LoginBody {
            email: &credentials.email,
            password: &credentials.password,
        };
        let response = self.post("/auth/login", &body).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => Err(AuthError::InvalidCredentials),
            _ => Self::issued_session(response).await,
        }
    }

    async fn current_user(&self, refresh_token: &str) -> AuthResult<Option<UserSummary>> {
        let response = self
            .post("/auth/session", &TokenBody { refresh_token })
            .await?;

        match response.status() {
            s if s.is_success() => Ok(Some(decode::<UserPayload>(response).await?.user)),
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(None),
            s => Err(IdentityError::Status(s.as_u16()).into()),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<IssuedSession> {
        let response = self
            .post("/auth/refresh", &TokenBody { refresh_token })
            .await?;
        Self::issued_session(response).await
    }

    async fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        let response = self
            .post("/auth/logout", &TokenBody { refresh_token })
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(IdentityError::Status(status.as_u16()).into())
        }
    }
}

/// "Who am I" against the gateway's own `/api/v1/auth/me`.
#[derive(Debug, Clone)]
pub struct HttpIdentityCheck {
    client: Client,
    me_url: String,
    cookie: Option<String>,
}

impl HttpIdentityCheck {
    pub fn new(me_url: impl Into<String>, timeout: Duration) -> Result<Self, IdentityError> {
        Ok(Self {
            client: build_client(timeout)?,
            me_url: me_url.into(),
            cookie: None,
        })
    }

    /// Send `name=value` as the `Cookie` header.
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookie = Some(format!("{name}={value}"));
        self
    }
}

impl IdentityCheck for HttpIdentityCheck {
    async fn current_user(&self) -> Result<Option<UserSummary>, IdentityError> {
        let mut request = self.client.get(&self.me_url);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await?;

        match response.status() {
            s if s.is_success() => Ok(Some(decode::<UserPayload>(response).await?.user)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            s => Err(IdentityError::Status(s.as_u16())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Json;
    use axum::http::HeaderMap;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::Router;
    use serde_json::{Value, json};
    use std::sync::Arc;

    use crate::application::auth_store::AuthStore;
    use crate::domain::value_object::user_role::UserRole;

    fn user_json(id: &str) -> Value {
        json!({"id": id, "email": format!("{id}@example.com"), "role": "admin"})
    }

    fn session_json() -> Value {
        json!({
            "user": user_json("ana"),
            "refreshToken": "rt-new",
            "expiresAt": "2030-01-01T00:00:00Z"
        })
    }

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Identity provider answering by the token or password it receives.
    fn identity_provider() -> Router {
        Router::new()
            .route(
                "/auth/login",
                post(|Json(body): Json<Value>| async move {
                    match body["password"].as_str() {
                        Some("right") => Json(session_json()).into_response(),
                        Some("") => StatusCode::BAD_REQUEST.into_response(),
                        _ => StatusCode::UNAUTHORIZED.into_response(),
                    }
                }),
            )
            .route(
                "/auth/session",
                post(|Json(body): Json<Value>| async move {
                    match body["refreshToken"].as_str() {
                        Some("live") => Json(json!({"user": user_json("bo")})).into_response(),
                        Some("gone") => StatusCode::NOT_FOUND.into_response(),
                        Some("broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
                        _ => StatusCode::UNAUTHORIZED.into_response(),
                    }
                }),
            )
            .route(
                "/auth/refresh",
                post(|Json(body): Json<Value>| async move {
                    match body["refreshToken"].as_str() {
                        Some("live") => Json(session_json()).into_response(),
                        _ => StatusCode::UNAUTHORIZED.into_response(),
                    }
                }),
            )
            .route(
                "/auth/logout",
                post(|Json(body): Json<Value>| async move {
                    match body["refreshToken"].as_str() {
                        Some("broken") => StatusCode::BAD_GATEWAY,
                        Some("unknown") => StatusCode::UNAUTHORIZED,
                        _ => StatusCode::NO_CONTENT,
                    }
                }),
            )
    }

    /// Stand-in for the gateway's own `/api/v1/auth/me`.
    fn gateway_me() -> Router {
        Router::new()
            .route(
                "/api/v1/auth/me",
                get(|headers: HeaderMap| async move {
                    match headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
                        Some("refreshToken=abc") => {
                            Json(json!({"user": user_json("cy")})).into_response()
                        }
                        Some("refreshToken=blocked") => StatusCode::FORBIDDEN.into_response(),
                        _ => StatusCode::UNAUTHORIZED.into_response(),
                    }
                }),
            )
            .route(
                "/down/me",
                get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            )
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "ana@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_session_payload_shape() {
        let payload: SessionPayload = serde_json::from_value(session_json()).unwrap();

        let session = IssuedSession::from(payload);
        assert_eq!(session.user.id, "ana");
        assert_eq!(session.refresh_token, "rt-new");
        assert_eq!(session.expires_at.to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let auth = HttpAuthenticator::new("http://idp.internal/v1/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(auth.url("/auth/login"), "http://idp.internal/v1/auth/login");
    }

    #[test]
    fn test_token_body_is_camel_case() {
        let body = serde_json::to_value(TokenBody { refresh_token: "rt" }).unwrap();
        assert_eq!(body, json!({"refreshToken": "rt"}));
    }

    #[tokio::test]
    async fn test_login_status_mapping() {
        let base = upstream(identity_provider()).await;
        let auth = HttpAuthenticator::new(base, DEFAULT_TIMEOUT).unwrap();

        let session = auth.login(&credentials("right")).await.unwrap();
        assert_eq!(session.user.role, UserRole::Admin);
        assert_eq!(session.refresh_token, "rt-new");

        assert!(matches!(
            auth.login(&credentials("wrong")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(&credentials("")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_current_user_status_mapping() {
        let base = upstream(identity_provider()).await;
        let auth = HttpAuthenticator::new(base, DEFAULT_TIMEOUT).unwrap();

        let user = auth.current_user("live").await.unwrap().unwrap();
        assert_eq!(user.id, "bo");

        assert_eq!(auth.current_user("expired").await.unwrap(), None);
        assert_eq!(auth.current_user("gone").await.unwrap(), None);

        let err = auth.current_user("broken").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Upstream(IdentityError::Status(500))
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_refresh_and_logout_status_mapping() {
        let base = upstream(identity_provider()).await;
        let auth = HttpAuthenticator::new(base, DEFAULT_TIMEOUT).unwrap();

        assert_eq!(auth.refresh("live").await.unwrap().refresh_token, "rt-new");
        assert!(matches!(
            auth.refresh("stale").await,
            Err(AuthError::SessionInvalid)
        ));

        auth.logout("live").await.unwrap();
        auth.logout("unknown").await.unwrap();
        assert!(matches!(
            auth.logout("broken").await,
            Err(AuthError::Upstream(IdentityError::Status(502)))
        ));
    }

    #[tokio::test]
    async fn test_slow_upstream_is_gateway_timeout() {
        let slow = Router::new().route(
            "/auth/login",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let base = upstream(slow).await;
        let auth = HttpAuthenticator::new(base, Duration::from_millis(100)).unwrap();

        let err = auth.login(&credentials("right")).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Upstream(IdentityError::Transport(_))
        ));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_identity_check_sends_cookie() {
        let base = upstream(gateway_me()).await;
        let me_url = format!("{base}/api/v1/auth/me");

        let check = HttpIdentityCheck::new(&me_url, DEFAULT_TIMEOUT)
            .unwrap()
            .with_cookie("refreshToken", "abc");
        assert_eq!(check.current_user().await.unwrap().unwrap().id, "cy");

        let blocked = HttpIdentityCheck::new(&me_url, DEFAULT_TIMEOUT)
            .unwrap()
            .with_cookie("refreshToken", "blocked");
        assert_eq!(blocked.current_user().await.unwrap(), None);

        let anonymous = HttpIdentityCheck::new(&me_url, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(anonymous.current_user().await.unwrap(), None);

        let down = HttpIdentityCheck::new(format!("{base}/down/me"), DEFAULT_TIMEOUT).unwrap();
        assert!(matches!(
            down.current_user().await,
            Err(IdentityError::Status(503))
        ));
    }

    #[tokio::test]
    async fn test_store_settles_anonymous_when_identity_check_fails() {
        let base = upstream(gateway_me()).await;
        let down = HttpIdentityCheck::new(format!("{base}/down/me"), DEFAULT_TIMEOUT).unwrap();

        let store = AuthStore::new(Arc::new(down));
        store.init();
        let state = store.settled().await;
        assert_eq!(state.user, None);
        assert!(!state.is_authenticated);
        assert!(!state.is_loading);

        // Nothing listens on a port whose listener was dropped.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let refused =
            HttpIdentityCheck::new(format!("http://{addr}/api/v1/auth/me"), DEFAULT_TIMEOUT)
                .unwrap();

        let store = AuthStore::new(Arc::new(refused));
        store.init();
        let state = store.settled().await;
        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_store_authenticates_through_identity_check() {
        let base = upstream(gateway_me()).await;
        let check = HttpIdentityCheck::new(format!("{base}/api/v1/auth/me"), DEFAULT_TIMEOUT)
            .unwrap()
            .with_cookie("refreshToken", "abc");

        let store = AuthStore::new(Arc::new(check));
        store.init();
        let state = store.settled().await;
        assert!(state.is_authenticated);
        assert_eq!(state.role(), Some(UserRole::Admin));
    }
}
