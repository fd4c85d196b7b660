//! The token store: scoped, alias-aware persistence of session fields.

use std::sync::Arc;

use tracing::warn;

use super::{MemoryScope, StorageScope};
use crate::auth::expiry;
use crate::models::{Session, UserProfile};

/// Storage key for the cached profile.
const PROFILE_KEY: &str = "user_profile";

/// A persisted session field.
///
/// Each field has one primary key (used for writes) and zero or more
/// legacy aliases that older deployments wrote and that reads still fall
/// back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    AccessToken,
    RefreshToken,
    ExpiresAt,
}

impl TokenField {
    /// The key new writes use.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
            Self::ExpiresAt => "token_expiry",
        }
    }

    /// Primary key followed by legacy aliases, in read priority order.
    #[must_use]
    pub fn key_chain(self) -> &'static [&'static str] {
        match self {
            Self::AccessToken => &["accessToken", "auth_token", "token"],
            Self::RefreshToken => &["refreshToken"],
            Self::ExpiresAt => &["token_expiry"],
        }
    }

    const ALL: [TokenField; 3] = [Self::AccessToken, Self::RefreshToken, Self::ExpiresAt];
}

/// Persistence of the session across a durable and a volatile scope.
///
/// Reads check the durable scope first, then the volatile one, walking
/// each field's key chain; writes go to the durable scope and are
/// mirrored into the volatile one. A scope failure is logged and treated
/// exactly like an absent value - callers never see a storage error.
pub struct TokenStore {
    durable: Arc<dyn StorageScope>,
    volatile: Arc<dyn StorageScope>,
}

impl TokenStore {
    /// Create a store over the given scopes.
    pub fn new(durable: Arc<dyn StorageScope>, volatile: Arc<dyn StorageScope>) -> Self {
        Self { durable, volatile }
    }

    /// Create a store with both scopes in memory. Nothing outlives the
    /// process; useful for tests and ephemeral embedding.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryScope::new()), Arc::new(MemoryScope::new()))
    }

    fn scopes(&self) -> [&Arc<dyn StorageScope>; 2] {
        [&self.durable, &self.volatile]
    }

    /// Read a field, first present non-empty value wins.
    pub async fn get(&self, field: TokenField) -> Option<String> {
        for scope in self.scopes() {
            for key in field.key_chain() {
                match scope.get(key).await {
                    Ok(Some(value)) if !value.is_empty() => return Some(value),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(scope = scope.name(), key, error = %e, "Storage read failed");
                    }
                }
            }
        }
        None
    }

    /// Write a field to the durable scope and mirror it to the volatile
    /// one. Returns false when neither scope accepted the write.
    pub async fn set(&self, field: TokenField, value: &str) -> bool {
        let mut stored = false;
        for scope in self.scopes() {
            match scope.set(field.key(), value).await {
                Ok(()) => stored = true,
                Err(e) => {
                    warn!(scope = scope.name(), key = field.key(), error = %e, "Storage write failed");
                }
            }
        }
        stored
    }

    /// Assemble the current session from stored fields.
    ///
    /// Returns `None` without an access token. A missing or unparseable
    /// expiry falls back to the token's own `exp` claim, and finally to
    /// the epoch - which downstream expiry checks treat as expired.
    pub async fn session(&self) -> Option<Session> {
        let access_token = self.get(TokenField::AccessToken).await?;
        let refresh_token = self.get(TokenField::RefreshToken).await.unwrap_or_default();
        let expires_at = match self
            .get(TokenField::ExpiresAt)
            .await
            .and_then(|v| v.parse::<i64>().ok())
        {
            Some(millis) => millis,
            None => expiry::decode_expiry(&access_token).unwrap_or(0),
        };
        Some(Session::with_expires_at(access_token, refresh_token, expires_at))
    }

    /// Persist all three session fields together.
    ///
    /// Validation of the session happens before this is called; the store
    /// never receives a partially constructed session.
    pub async fn store_session(&self, session: &Session) -> bool {
        let a = self.set(TokenField::AccessToken, &session.access_token).await;
        let r = self.set(TokenField::RefreshToken, &session.refresh_token).await;
        let e = self
            .set(TokenField::ExpiresAt, &session.expires_at.to_string())
            .await;
        a && r && e
    }

    /// Read the cached profile, if any.
    pub async fn cached_profile(&self) -> Option<UserProfile> {
        for scope in self.scopes() {
            match scope.get(PROFILE_KEY).await {
                Ok(Some(json)) if !json.is_empty() => match serde_json::from_str(&json) {
                    Ok(profile) => return Some(profile),
                    Err(e) => {
                        warn!(scope = scope.name(), error = %e, "Cached profile unreadable");
                    }
                },
                Ok(_) => {}
                Err(e) => {
                    warn!(scope = scope.name(), error = %e, "Storage read failed");
                }
            }
        }
        None
    }

    /// Cache the profile next to the session.
    pub async fn cache_profile(&self, profile: &UserProfile) -> bool {
        let json = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Profile serialization failed");
                return false;
            }
        };
        let mut stored = false;
        for scope in self.scopes() {
            match scope.set(PROFILE_KEY, &json).await {
                Ok(()) => stored = true,
                Err(e) => {
                    warn!(scope = scope.name(), error = %e, "Storage write failed");
                }
            }
        }
        stored
    }

    /// Remove every known key variant from both scopes. Idempotent.
    pub async fn clear(&self) {
        for scope in self.scopes() {
            for field in TokenField::ALL {
                for key in field.key_chain() {
                    if let Err(e) = scope.remove(key).await {
                        warn!(scope = scope.name(), key, error = %e, "Storage remove failed");
                    }
                }
            }
            if let Err(e) = scope.remove(PROFILE_KEY).await {
                warn!(scope = scope.name(), key = PROFILE_KEY, error = %e, "Storage remove failed");
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("durable", &self.durable.name())
            .field("volatile", &self.volatile.name())
            .finish()
    }
}
