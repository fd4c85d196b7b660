//! Storage scopes for persisting session fields.
//!
//! Provides the [`StorageScope`] trait and implementations:
//! - [`FileScope`] - JSON file with 0600 permissions (durable)
//! - [`MemoryScope`] - In-memory (volatile / testing)
//! - [`KeyringScope`] - System keyring (feature-gated, durable)
//!
//! [`TokenStore`] layers the durable-then-volatile lookup, legacy key
//! aliases, and degrade-to-absent error handling on top of the scopes.

mod file;
mod memory;
mod store;

#[cfg(feature = "keyring")]
mod keyring;

use async_trait::async_trait;

pub use file::FileScope;
pub use memory::MemoryScope;
pub use store::{TokenField, TokenStore};

#[cfg(feature = "keyring")]
pub use self::keyring::KeyringScope;

use crate::error::Result;

/// A single key/value storage backend.
///
/// Scopes are deliberately string-valued: the [`TokenStore`] reads fields
/// through a chain of historical key names, which needs per-key access
/// rather than whole-session load/save.
#[async_trait]
pub trait StorageScope: Send + Sync {
    /// Read a value. `Ok(None)` means absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Name of this scope, for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Blanket impl for `Arc<T>`.
#[async_trait]
impl<T: StorageScope + ?Sized> StorageScope for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }
    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}
