//! Session-level operations: login, logout, current user.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::{Config, LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH};
use crate::error::{Error, Result};
use crate::models::{Session, UserProfile};
use crate::storage::{TokenField, TokenStore};
use crate::transport::AuthHttpClient;

/// Session-level state visible to embedders.
///
/// `Anonymous -> [login] -> Authenticated -> [refresh, repeatable] ->
/// Authenticated -> [logout | terminal refresh failure] -> Anonymous`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No valid session. Initial state, and terminal on failure.
    #[default]
    Anonymous,
    /// A session is established.
    Authenticated,
}

/// Wire shape of the login endpoint response.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    crate::config::DEFAULT_TOKEN_LIFETIME_SECS
}

/// Login, logout, and current-user operations on top of the
/// authenticated transport.
pub struct SessionGate {
    /// Raw client for the unauthenticated login call and the best-effort
    /// logout call. Everything else goes through `http`.
    client: reqwest::Client,
    http: Arc<AuthHttpClient>,
    store: Arc<TokenStore>,
    config: Arc<Config>,
    state: watch::Sender<SessionState>,
}

impl SessionGate {
    /// Create a gate over the given transport and store.
    pub fn new(
        client: reqwest::Client,
        config: Arc<Config>,
        store: Arc<TokenStore>,
        http: Arc<AuthHttpClient>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            client,
            http,
            store,
            config,
            state,
        }
    }

    /// True iff a non-expired access token is stored. No network call.
    pub async fn is_authenticated(&self) -> bool {
        match self.store.session().await {
            Some(session) => !session.is_expired(),
            None => false,
        }
    }

    /// Log in with email and password.
    ///
    /// On success the session is stored, the profile is fetched and
    /// cached, and the state switches to `Authenticated`. A 4xx response
    /// rejects with [`Error::InvalidCredentials`]; nothing is mutated on
    /// failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let url = self.config.endpoint(LOGIN_PATH);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        let status = response.status().as_u16();
        if (400..500).contains(&status) {
            debug!(status, "Login rejected");
            return Err(Error::InvalidCredentials);
        }
        if !(200..300).contains(&status) {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }

        let body: LoginResponse = response.json().await.map_err(|_| Error::Api {
            status,
            message: "malformed login response".into(),
        })?;

        let session = Session::new(body.access_token, body.refresh_token, body.expires_in);
        self.store.store_session(&session).await;

        // A failed profile fetch must not leave a half-established login:
        // purge the just-stored session so the caller sees no session at all.
        let profile = match self.fetch_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "Profile fetch after login failed, discarding session");
                self.store.clear().await;
                self.publish_anonymous();
                return Err(e);
            }
        };
        self.store.cache_profile(&profile).await;
        self.state.send_replace(SessionState::Authenticated);
        info!(collaborator = %profile.id, "Logged in");

        Ok(profile)
    }

    /// Log out: best-effort server call, then unconditional local purge.
    ///
    /// Idempotent and infallible - this is called from failure handlers,
    /// so every internal error is swallowed after cleanup.
    pub async fn logout(&self) {
        let url = self.config.endpoint(LOGOUT_PATH);
        let mut request = self.client.post(&url);
        if let Some(token) = self.store.get(TokenField::AccessToken).await {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Err(e) = request.send().await {
            debug!(error = %e, "Logout request failed, purging locally anyway");
        }

        self.store.clear().await;
        self.publish_anonymous();
        info!("Logged out");
    }

    /// The current collaborator's profile.
    ///
    /// Served from the cache while the session is valid, fetched (and
    /// re-cached) otherwise. A terminal failure drops the published
    /// state to `Anonymous`.
    pub async fn current_user(&self) -> Result<UserProfile> {
        if self.is_authenticated().await {
            if let Some(profile) = self.store.cached_profile().await {
                return Ok(profile);
            }
        }

        let profile = match self.fetch_profile().await {
            Ok(profile) => profile,
            Err(e) => {
                if e.requires_login() {
                    self.publish_anonymous();
                }
                return Err(e);
            }
        };
        self.store.cache_profile(&profile).await;
        Ok(profile)
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribe to session state transitions.
    ///
    /// Embedders use this to navigate to the login entry point when the
    /// state drops back to `Anonymous`.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Recompute the published state from storage. Called once at client
    /// construction so a persisted session is reflected immediately.
    pub(crate) async fn sync_state(&self) {
        let state = if self.is_authenticated().await {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        self.state.send_replace(state);
    }

    /// Publish `Anonymous` after an observed session loss, without waking
    /// watchers that already see it.
    fn publish_anonymous(&self) {
        self.state.send_if_modified(|state| {
            if *state != SessionState::Anonymous {
                *state = SessionState::Anonymous;
                true
            } else {
                false
            }
        });
    }

    async fn fetch_profile(&self) -> Result<UserProfile> {
        let response = self.http.get(PROFILE_PATH).await?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let message = response.text().await.unwrap_or_default();
            warn!(status, "Profile fetch failed");
            return Err(Error::Api { status, message });
        }
        response.json().await.map_err(|_| Error::Api {
            status,
            message: "malformed profile response".into(),
        })
    }
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("base_url", &self.config.base_url)
            .field("state", &self.state())
            .finish()
    }
}
