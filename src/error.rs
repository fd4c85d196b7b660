//! Error types for taskboard-client.

use thiserror::Error;

/// The main error type for taskboard-client.
///
/// The enum is `Clone` so that a single refresh outcome can be handed to
/// every caller waiting on the same in-flight attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // ── Session / refresh ────────────────────────────────────────────────────
    /// Refresh was attempted with no refresh token stored.
    #[error("No refresh token stored - log in required")]
    NoRefreshToken,

    /// The server rejected the refresh token. Terminal for the session.
    #[error("Refresh token rejected by the server")]
    RefreshTokenInvalid,

    /// Refresh failed with a non-auth status. The session is left intact.
    #[error("Token refresh failed with status {0}")]
    RefreshFailed(u16),

    /// Refresh returned 2xx but the body lacked the expected fields.
    #[error("Refresh response missing expected fields")]
    MalformedRefreshResponse,

    /// No access token stored and refresh could not establish one.
    #[error("No session available - log in required")]
    SessionUnavailable,

    /// Retry budget exhausted after 401/403 responses.
    #[error("Session expired - log in again")]
    SessionExpired,

    /// Login was rejected by the server.
    #[error("Invalid email or password")]
    InvalidCredentials,

    // ── API ──────────────────────────────────────────────────────────────────
    /// API returned an error response outside the auth-retry path.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    // ── Infrastructure ───────────────────────────────────────────────────────
    /// Network/HTTP transport error.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if this error means the user has to log in again.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Error::NoRefreshToken
                | Error::RefreshTokenInvalid
                | Error::SessionUnavailable
                | Error::SessionExpired
                | Error::InvalidCredentials
        )
    }

    /// Returns true for transport-level failures that did not mutate the session.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout | Error::RefreshFailed(_)
        )
    }

    /// Map a reqwest error onto the crate taxonomy.
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(e.to_string())
        }
    }
}

/// Convenience type alias.
pub type Result<T> = std::result::Result<T, Error>;
