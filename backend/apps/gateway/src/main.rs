//! Gateway Entry Point
//!
//! Serves the auth API and the statically built frontend. Every page
//! request passes the edge middleware first.
//! Uses `anyhow` for startup errors; request-level errors are
//! `auth::AuthError` rendered as problem JSON.

mod config;

use std::sync::Arc;

use auth::{AuthConfig, HttpAuthenticator, UnmatchedRoutePolicy, auth_router, edge_guard};
use axum::{
    Router, http,
    http::{Method, header},
    middleware::from_fn_with_state,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::GatewayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gateway=info,auth=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;

    tracing::info!(
        environment = %config.environment,
        upstream = %config.auth_upstream_url,
        frontend_dir = %config.frontend_dir.display(),
        "Gateway configuration loaded"
    );

    // Auth configuration
    let auth_config = AuthConfig::for_environment(
        config.environment,
        config.cookie_domain.as_deref(),
    )?
    .with_unmatched_policy(config.unmatched_policy);

    if auth_config.unmatched_policy == UnmatchedRoutePolicy::FailOpen {
        tracing::warn!(
            "Unmatched routes are served without a session; \
             set UNMATCHED_ROUTE_POLICY=closed to require one"
        );
    }

    let auth_config = Arc::new(auth_config);
    let authenticator = HttpAuthenticator::new(&config.auth_upstream_url, config.upstream_timeout)?;

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Frontend pages, gated at the edge
    let frontend = Router::new()
        .fallback_service(ServeDir::new(&config.frontend_dir))
        .layer(from_fn_with_state(auth_config.clone(), edge_guard));

    // Build router
    let app = Router::new()
        .nest("/api/v1/auth", auth_router(authenticator, auth_config))
        .fallback_service(frontend)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", config.listen_addr);

    let listener = TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
