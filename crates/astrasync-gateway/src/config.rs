//! Gateway configuration.

use std::time::Duration;

use tracing::warn;

/// Production registration endpoint.
pub const DEFAULT_API_URL: &str = "https://astrasync-api-production.up.railway.app/v1";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "ASTRASYNC_API_URL";
pub const ENV_EMAIL: &str = "ASTRASYNC_EMAIL";
pub const ENV_TIMEOUT_SECS: &str = "ASTRASYNC_TIMEOUT_SECS";

/// User agent sent with every request.
pub fn user_agent() -> String {
    format!("AstraSync-Rust-SDK/{}", astrasync_core::VERSION)
}

/// Registration client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL, without the trailing `/register`
    pub api_url: String,
    /// Default developer email for registrations
    pub email: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            email: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: user_agent(),
        }
    }
}

impl GatewayConfig {
    /// Defaults overridden by `ASTRASYNC_API_URL`, `ASTRASYNC_EMAIL` and
    /// `ASTRASYNC_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = non_blank(ENV_API_URL) {
            config = config.with_api_url(url);
        }
        config.email = non_blank(ENV_EMAIL);
        if let Some(raw) = non_blank(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => warn!(
                    variable = ENV_TIMEOUT_SECS,
                    value = %raw,
                    "ignoring non-numeric timeout"
                ),
            }
        }
        config
    }

    /// Trailing slashes are dropped.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{api_url}/{path}`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
