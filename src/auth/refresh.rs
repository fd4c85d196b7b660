//! Single-flight token refresh.

use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_TOKEN_LIFETIME_SECS, REFRESH_PATH};
use crate::error::{Error, Result};
use crate::models::Session;
use crate::storage::{TokenField, TokenStore};

/// Wire shape of the refresh endpoint response.
///
/// `access_token` is optional here so a 2xx body missing it surfaces as
/// [`Error::MalformedRefreshResponse`] rather than a decode error.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    DEFAULT_TOKEN_LIFETIME_SECS
}

type RefreshFuture = Shared<BoxFuture<'static, Result<Session>>>;

/// Exchanges the stored refresh token for a new access token, at most
/// once per overlapping set of callers.
///
/// Every `refresh()` call that arrives while an attempt is in flight
/// awaits that same attempt and observes its single outcome. Without
/// this, N callers discovering an expired token together would issue N
/// refresh calls - and with server-side refresh-token rotation, N-1 of
/// them would invalidate each other.
pub struct RefreshCoordinator {
    http: reqwest::Client,
    config: Arc<Config>,
    store: Arc<TokenStore>,
    pending: Mutex<Option<RefreshFuture>>,
}

impl RefreshCoordinator {
    /// Create a coordinator over the given client, config, and store.
    pub fn new(http: reqwest::Client, config: Arc<Config>, store: Arc<TokenStore>) -> Self {
        Self {
            http,
            config,
            store,
            pending: Mutex::new(None),
        }
    }

    /// Refresh the session, joining an in-flight attempt when one exists.
    ///
    /// Terminal failures (`NoRefreshToken`, `RefreshTokenInvalid`) clear
    /// the store; transient ones leave it intact.
    pub async fn refresh(&self) -> Result<Session> {
        let attempt = {
            let mut pending = self.pending.lock().await;
            match pending.as_ref() {
                Some(inflight) => {
                    debug!("Joining in-flight refresh attempt");
                    inflight.clone()
                }
                None => {
                    let attempt = self.begin_attempt();
                    *pending = Some(attempt.clone());
                    attempt
                }
            }
        };

        let outcome = attempt.clone().await;

        // Clear the pending marker, but only if it still refers to the
        // attempt we awaited - a newer one must not be clobbered.
        let mut pending = self.pending.lock().await;
        if pending.as_ref().is_some_and(|p| p.ptr_eq(&attempt)) {
            *pending = None;
        }
        drop(pending);

        outcome
    }

    fn begin_attempt(&self) -> RefreshFuture {
        let http = self.http.clone();
        let config = Arc::clone(&self.config);
        let store = Arc::clone(&self.store);
        async move { perform_refresh(http, config, store).await }
            .boxed()
            .shared()
    }
}

async fn perform_refresh(
    http: reqwest::Client,
    config: Arc<Config>,
    store: Arc<TokenStore>,
) -> Result<Session> {
    let Some(refresh_token) = store.get(TokenField::RefreshToken).await else {
        warn!("Refresh requested with no refresh token stored");
        store.clear().await;
        return Err(Error::NoRefreshToken);
    };

    debug!("Refreshing access token");
    let url = config.endpoint(REFRESH_PATH);
    let response = http
        .post(&url)
        .json(&serde_json::json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .map_err(Error::from_reqwest)?;

    let status = response.status().as_u16();
    match status {
        401 | 403 => {
            warn!(status, "Refresh token rejected, clearing session");
            store.clear().await;
            Err(Error::RefreshTokenInvalid)
        }
        200..=299 => {
            let body: RefreshResponse = response
                .json()
                .await
                .map_err(|_| Error::MalformedRefreshResponse)?;
            let Some(access_token) = body.access_token.filter(|t| !t.is_empty()) else {
                warn!("Refresh response missing access token, keeping stored session");
                return Err(Error::MalformedRefreshResponse);
            };

            // Keep the old refresh token unless the server rotated it.
            let refresh_token = body
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or(refresh_token);

            let session = Session::new(access_token, refresh_token, body.expires_in);
            store.store_session(&session).await;
            info!("Token refreshed");
            Ok(session)
        }
        _ => {
            warn!(status, "Refresh failed, session kept for later retry");
            Err(Error::RefreshFailed(status))
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
