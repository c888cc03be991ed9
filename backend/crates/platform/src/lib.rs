//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Deployment environment signal (production vs. development)
//! - Cookie attribute policy for the refresh-token and session-presence cookies
//! - `Set-Cookie` rendering and `Cookie` header lookup

pub mod cookie;
pub mod environment;

pub use cookie::{CookieOptions, CookiePolicy, CookiePolicyError, SameSite};
pub use environment::Environment;
