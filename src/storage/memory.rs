//! In-memory storage scope.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::StorageScope;
use crate::error::Result;

/// In-memory scope. The volatile default, also used in tests.
///
/// Contents survive only as long as the process; this is the crate's
/// rendition of per-tab storage.
pub struct MemoryScope {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryScope {
    /// Create a new empty in-memory scope.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryScope {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageScope for MemoryScope {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_scope() {
        let scope = MemoryScope::new();

        assert!(scope.get("accessToken").await.unwrap().is_none());

        scope.set("accessToken", "T1").await.unwrap();
        assert_eq!(scope.get("accessToken").await.unwrap().as_deref(), Some("T1"));

        scope.remove("accessToken").await.unwrap();
        assert!(scope.get("accessToken").await.unwrap().is_none());

        // Removing again is fine.
        scope.remove("accessToken").await.unwrap();
    }
}
