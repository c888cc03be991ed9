//! Gateway Configuration
//!
//! Read once at startup from the process environment (after `.env`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::UnmatchedRoutePolicy;
use platform::environment::Environment;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_DIR: &str = "./frontend/out";
const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:31114/api/v1";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub cookie_domain: Option<String>,
    pub listen_addr: SocketAddr,
    pub frontend_dir: PathBuf,
    pub auth_upstream_url: String,
    pub upstream_timeout: Duration,
    pub frontend_origins: Vec<String>,
    pub unmatched_policy: UnmatchedRoutePolicy,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("APP_ENV")
            .map(|v| Environment::from_app_env(&v))
            .unwrap_or_default();

        let cookie_domain = var("COOKIE_DOMAIN");
        if environment.is_production() && cookie_domain.is_none() {
            bail!("COOKIE_DOMAIN must be set when APP_ENV=production");
        }

        let listen_addr = var("LISTEN_ADDR")
            .as_deref()
            .unwrap_or(DEFAULT_LISTEN_ADDR)
            .parse()
            .context("LISTEN_ADDR is not a socket address")?;

        let auth_upstream_url = match var("AUTH_UPSTREAM_URL") {
            Some(url) => url,
            None if environment.is_production() => {
                bail!("AUTH_UPSTREAM_URL must be set when APP_ENV=production")
            }
            None => DEFAULT_UPSTREAM_URL.to_string(),
        };

        let upstream_timeout = match var("AUTH_UPSTREAM_TIMEOUT_MS") {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse()
                    .context("AUTH_UPSTREAM_TIMEOUT_MS is not a number")?,
            ),
            None => auth::infra::http::DEFAULT_TIMEOUT,
        };

        let unmatched_policy = match var("UNMATCHED_ROUTE_POLICY") {
            Some(value) => UnmatchedRoutePolicy::from_setting(&value).with_context(|| {
                format!("UNMATCHED_ROUTE_POLICY must be `open` or `closed`, got `{value}`")
            })?,
            None => UnmatchedRoutePolicy::default(),
        };

        let frontend_origins = var("FRONTEND_ORIGINS")
            .as_deref()
            .unwrap_or(DEFAULT_FRONTEND_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            environment,
            cookie_domain,
            listen_addr,
            frontend_dir: PathBuf::from(var("FRONTEND_DIR").as_deref().unwrap_or(DEFAULT_FRONTEND_DIR)),
            auth_upstream_url,
            upstream_timeout,
            frontend_origins,
            unmatched_policy,
        })
    }
}
