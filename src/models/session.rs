//! The client-side session: access token, refresh token, expiry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::expiry;

/// The tuple of credentials the client currently considers valid.
///
/// `expires_at` is always derived from the most recent access-token
/// issuance - either `now + expires_in` from the server response, or the
/// token's own `exp` claim. It is stored as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer credential sent with each API request.
    pub access_token: String,
    /// Longer-lived credential exchanged for new access tokens.
    pub refresh_token: String,
    /// Epoch milliseconds at which the access token expires.
    pub expires_at: i64,
}

impl Session {
    /// Create a session expiring `expires_in` seconds from now.
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: expiry::now_millis() + expires_in * 1000,
        }
    }

    /// Create a session with an explicit expiry timestamp (epoch millis).
    ///
    /// Useful when rehydrating a session from storage.
    pub fn with_expires_at(access_token: String, refresh_token: String, expires_at: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    /// Check whether the access token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        expiry::is_expired(self.expires_at)
    }

    /// Check whether the access token expires within the given window.
    #[must_use]
    pub fn needs_refresh(&self, threshold: Duration) -> bool {
        expiry::is_near_expiry(self.expires_at, threshold)
    }
}
