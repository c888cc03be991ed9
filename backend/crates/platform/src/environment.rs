//! Deployment environment
//!
//! A single production/non-production flag gates every cookie attribute
//! decision in the gateway.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    /// Interpret an `APP_ENV`-style value.
    ///
    /// Only `production` (any case, surrounding whitespace ignored) selects
    /// production; everything else, including an empty value, is development.
    pub fn from_app_env(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    #[inline]
    pub const fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
