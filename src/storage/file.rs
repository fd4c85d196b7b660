//! File-based storage scope with secure permissions.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::StorageScope;
use crate::error::{Error, Result};

/// File-backed scope storing all keys in one JSON object with 0600 permissions.
///
/// This is the durable default: contents survive process restarts.
pub struct FileScope {
    path: PathBuf,
}

impl FileScope {
    /// Create a scope at the specified path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a scope at the default path:
    /// `~/.config/taskboard-client/session.json`
    pub fn default_path() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot determine config directory".into()))?;
        let path = config_dir.join("taskboard-client").join("session.json");
        Ok(Self::new(path))
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e)))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| Error::Storage(e.to_string()))
    }

    fn write_all(&self, data: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Storage(format!("{}: {}", parent.display(), e)))?;
        }

        let content =
            serde_json::to_string_pretty(data).map_err(|e| Error::Storage(e.to_string()))?;
        std::fs::write(&self.path, &content)
            .map_err(|e| Error::Storage(format!("{}: {}", self.path.display(), e)))?;

        // Set 0600 permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)
                .map_err(|e| Error::Storage(format!("{}: chmod: {}", self.path.display(), e)))?;
        }

        debug!(path = %self.path.display(), "Session fields saved");
        Ok(())
    }
}

#[async_trait]
impl StorageScope for FileScope {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self.read_all()?;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.read_all()?;
        data.insert(key.to_string(), value.to_string());
        self.write_all(&data)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut data = self.read_all()?;
        if data.remove(key).is_some() {
            self.write_all(&data)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
