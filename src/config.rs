//! Configuration and endpoint paths for the Taskboard API.

use std::time::Duration;

use crate::error::{Error, Result};

/// Proactive refresh threshold - refresh when the token expires within this window.
pub const DEFAULT_REFRESH_THRESHOLD: Duration = Duration::from_secs(300); // 5 minutes

/// Overall timeout for API requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connect timeout for HTTP requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum refresh-and-retry cycles after a 401/403 response.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Assumed access-token lifetime when the server omits `expiresIn`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/collaborators/login";

/// Token refresh endpoint path.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Current-user profile endpoint path.
pub const PROFILE_PATH: &str = "/collaborators/me";

/// Logout endpoint path (best-effort).
pub const LOGOUT_PATH: &str = "/collaborators/logout";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Taskboard API, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Refresh proactively when the token expires within this window.
    pub refresh_threshold: Duration,
    /// Overall per-request timeout.
    pub request_timeout: Duration,
    /// Maximum refresh-and-retry cycles after a 401/403 response.
    pub max_retries: u32,
}

impl Config {
    /// Create a configuration with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            refresh_threshold: DEFAULT_REFRESH_THRESHOLD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Validate the base URL. Accepts http/https URLs only.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(Error::Config(format!(
                "Unsupported base URL scheme '{}' (expected http or https)",
                other
            ))),
        }
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
