//! File-based session storage
//!
//! Keeps the token as JSON in a file so it survives between runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use super::store::SessionStore;
use crate::Result;

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    token: String,
}

/// File-based session store
pub struct FileSessionStore {
    path: PathBuf,
    cache: RwLock<Option<String>>,
}

impl FileSessionStore {
    /// Open the store at `path`
    ///
    /// A missing file means no token; the file is created on first `set`.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let token = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            let file: SessionFile = serde_json::from_str(&content)?;
            Some(file.token)
        } else {
            None
        };

        Ok(Self {
            path,
            cache: RwLock::new(token),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, token: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(&SessionFile {
            token: token.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self) -> Result<Option<String>> {
        Ok(self.cache.read().await.clone())
    }

    async fn set(&self, token: &str) -> Result<()> {
        self.persist(token).await?;
        *self.cache.write().await = Some(token.to_string());
        debug!("Session token stored at {:?}", self.path);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.cache.write().await = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Session file removed: {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileSessionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("session.json");
        let store = FileSessionStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_missing_file_means_no_token() {
        let (store, _temp) = create_test_store().await;
        assert!(store.get().await.unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_set_overwrites_previous_token() {
        let (store, _temp) = create_test_store().await;

        store.set("first").await.unwrap();
        store.set("second").await.unwrap();

        assert_eq!(store.get().await.unwrap().as_deref(), Some("second"));
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("second"));
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let (store, _temp) = create_test_store().await;

        store.set("abc123").await.unwrap();
        assert!(store.path().exists());

        store.clear().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
        assert!(!store.path().exists());

        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        {
            let store = FileSessionStore::new(&path).await.unwrap();
            store.set("9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b").await.unwrap();
        }

        {
            let store = FileSessionStore::new(&path).await.unwrap();
            assert_eq!(
                store.get().await.unwrap().as_deref(),
                Some("9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")
            );
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileSessionStore::new(&path).await;
        assert!(matches!(result, Err(crate::ClientError::Serialization(_))));
    }
}
