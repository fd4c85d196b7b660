//! Authenticated HTTP client with token refresh and bounded retry.
//!
//! This is the sole path through which the rest of the crate makes
//! authenticated calls: it attaches the bearer token, refreshes
//! proactively when the stored token is expired, and retries a bounded
//! number of times after 401/403 responses.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use tracing::{debug, warn};

use crate::auth::RefreshCoordinator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::TokenStore;

/// Authenticated HTTP client for the Taskboard API.
pub struct AuthHttpClient {
    client: reqwest::Client,
    config: Arc<Config>,
    store: Arc<TokenStore>,
    refresh: Arc<RefreshCoordinator>,
}

impl AuthHttpClient {
    /// Create a new authenticated client.
    pub fn new(
        client: reqwest::Client,
        config: Arc<Config>,
        store: Arc<TokenStore>,
        refresh: Arc<RefreshCoordinator>,
    ) -> Self {
        Self {
            client,
            config,
            store,
            refresh,
        }
    }

    /// Send a GET request to an API path.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        self.execute(Method::GET, path, None, None).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        self.execute(Method::POST, path, Some(body), None).await
    }

    /// Send a PUT request with a JSON body.
    pub async fn put_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        self.execute(Method::PUT, path, Some(body), None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<reqwest::Response> {
        self.execute(Method::DELETE, path, None, None).await
    }

    /// Send a request with the full set of knobs.
    ///
    /// Behavior:
    /// 1. With no stored token, a refresh is attempted first; if that
    ///    fails the call rejects with [`Error::SessionUnavailable`].
    /// 2. An expired stored token triggers a refresh before the request.
    /// 3. `Authorization` is always the bearer token - caller headers
    ///    cannot override it.
    /// 4. On 401/403 the client refreshes and retries, at most
    ///    `max_retries` times, then rejects with [`Error::SessionExpired`].
    /// 5. Every other response is returned as-is; business-level error
    ///    bodies are the caller's to interpret.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: Option<HeaderMap>,
    ) -> Result<reqwest::Response> {
        let url = self.config.endpoint(path);
        let mut access_token = self.ensure_token().await?;
        let mut attempt: u32 = 0;

        loop {
            let mut request = self.client.request(method.clone(), &url);
            // Caller headers first so the auth headers below always win.
            if let Some(extra) = &headers {
                request = request.headers(extra.clone());
            }
            request = request.headers(auth_headers(&access_token));
            if let Some(json) = body {
                request = request.json(json);
            }

            let response = request.send().await.map_err(Error::from_reqwest)?;
            let status = response.status().as_u16();

            if status != 401 && status != 403 {
                return Ok(response);
            }

            if attempt >= self.config.max_retries {
                warn!(status, attempt, "Retry budget exhausted, session expired");
                return Err(Error::SessionExpired);
            }
            attempt += 1;

            debug!(status, attempt, "Auth rejected, refreshing and retrying");
            access_token = match self.refresh.refresh().await {
                Ok(session) => session.access_token,
                Err(e) => {
                    warn!(error = %e, "Refresh during retry failed");
                    return Err(Error::SessionExpired);
                }
            };
        }
    }

    /// Produce a usable access token, refreshing when the stored one is
    /// absent, expired, or inside the proactive-refresh window.
    async fn ensure_token(&self) -> Result<String> {
        match self.store.session().await {
            Some(session) if !session.needs_refresh(self.config.refresh_threshold) => {
                Ok(session.access_token)
            }
            Some(session) => {
                debug!("Stored token expired or near expiry, refreshing before request");
                match self.refresh.refresh().await {
                    Ok(refreshed) => Ok(refreshed.access_token),
                    // A transient failure while the token is still inside
                    // its lifetime is survivable with the current token.
                    Err(e) if e.is_transient() && !session.is_expired() => {
                        warn!(error = %e, "Proactive refresh failed, continuing with current token");
                        Ok(session.access_token)
                    }
                    // Terminal refresh failures end the session; transient
                    // ones surface as themselves so the caller can retry.
                    Err(e) if e.is_transient() => Err(e),
                    Err(_) => Err(Error::SessionExpired),
                }
            }
            None => {
                debug!("No stored session, attempting refresh");
                self.refresh
                    .refresh()
                    .await
                    .map(|session| session.access_token)
                    .map_err(|_| Error::SessionUnavailable)
            }
        }
    }
}

/// Headers attached to every authenticated request.
fn auth_headers(access_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", access_token))
            .unwrap_or_else(|_| HeaderValue::from_static("Bearer invalid")),
    );

    // Unique ID for request tracing.
    headers.insert(
        HeaderName::from_static("x-request-id"),
        HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("00000000-0000-0000-0000-000000000000")),
    );

    headers
}

impl std::fmt::Debug for AuthHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHttpClient")
            .field("base_url", &self.config.base_url)
            .field("max_retries", &self.config.max_retries)
            .finish()
    }
}
