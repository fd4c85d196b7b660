//! System keyring storage scope (feature-gated).

use async_trait::async_trait;
use tracing::debug;

use super::StorageScope;
use crate::error::{Error, Result};

const SERVICE_NAME: &str = "taskboard-client";

/// Durable scope backed by the system keyring
/// (Secret Service / Keychain / Credential Manager).
///
/// Each session field is stored as its own keyring entry under the
/// `taskboard-client` service.
pub struct KeyringScope;

impl KeyringScope {
    /// Create a new keyring scope.
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeyringScope {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageScope for KeyringScope {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = keyring::Entry::new(SERVICE_NAME, key)
            .map_err(|e| Error::Storage(format!("keyring: {}", e)))?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::Storage(format!("keyring: {}", e))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = keyring::Entry::new(SERVICE_NAME, key)
            .map_err(|e| Error::Storage(format!("keyring: {}", e)))?;
        entry
            .set_password(value)
            .map_err(|e| Error::Storage(format!("keyring: {}", e)))?;
        debug!(key, "Field saved to keyring");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let entry = keyring::Entry::new(SERVICE_NAME, key)
            .map_err(|e| Error::Storage(format!("keyring: {}", e)))?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Storage(format!("keyring: {}", e))),
        }
    }

    fn name(&self) -> &str {
        "keyring"
    }
}
