//! SecureStorage collaborator — best-effort key/value cache.
//!
//! Holds a role hint so the app can route to the right home screen before
//! the profile loads. Never authoritative: the committed profile is.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SecureStoreError;

/// Key for the cached role hint.
pub const ROLE_HINT_KEY: &str = "role_hint";

/// Minimal set/get surface over the platform's secure store.
#[async_trait]
pub trait SecureStorage: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), SecureStoreError>;
    async fn get(&self, key: &str) -> Result<Option<String>, SecureStoreError>;
}

/// In-memory secure store, for tests.
#[derive(Default)]
pub struct MemorySecureStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecureStorage for MemorySecureStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), SecureStoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SecureStoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}

/// JSON-file secure store used by the CLI binary.
///
/// Reads and rewrites the whole file per operation; the store holds a
/// handful of small hints, nothing more.
pub struct FileSecureStore {
    path: PathBuf,
}

impl FileSecureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<HashMap<String, String>, SecureStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| SecureStoreError::Read(format!("parse {}: {e}", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(SecureStoreError::Read(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[async_trait]
impl SecureStorage for FileSecureStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), SecureStoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SecureStoreError::Write(format!("mkdir {}: {e}", parent.display())))?;
        }
        let contents = serde_json::to_string_pretty(&entries)
            .map_err(|e| SecureStoreError::Write(format!("serialize: {e}")))?;
        std::fs::write(&self.path, contents)
            .map_err(|e| SecureStoreError::Write(format!("write {}: {e}", self.path.display())))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SecureStoreError> {
        Ok(self.load()?.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemorySecureStore::new();
        assert_eq!(store.get(ROLE_HINT_KEY).await.unwrap(), None);
        store.set(ROLE_HINT_KEY, "producer").await.unwrap();
        assert_eq!(
            store.get(ROLE_HINT_KEY).await.unwrap().as_deref(),
            Some("producer")
        );
    }

    #[tokio::test]
    async fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure.json");
        let store = FileSecureStore::new(&path);

        assert_eq!(store.get("missing").await.unwrap(), None);
        store.set(ROLE_HINT_KEY, "organization").await.unwrap();
        store.set("other", "x").await.unwrap();

        // A fresh handle sees the persisted values.
        let reopened = FileSecureStore::new(&path);
        assert_eq!(
            reopened.get(ROLE_HINT_KEY).await.unwrap().as_deref(),
            Some("organization")
        );
        assert_eq!(reopened.get("other").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn file_store_overwrites_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSecureStore::new(dir.path().join("secure.json"));
        store.set(ROLE_HINT_KEY, "producer").await.unwrap();
        store.set(ROLE_HINT_KEY, "organization").await.unwrap();
        assert_eq!(
            store.get(ROLE_HINT_KEY).await.unwrap().as_deref(),
            Some("organization")
        );
    }
}
