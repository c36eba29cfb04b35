//! In-memory KeyValueStore. Nothing survives the process.

use crate::domain::DomainError;
use crate::ports::KeyValueStore;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. to simulate a snapshot left by an earlier run.
    pub async fn insert(&self, key: &str, snapshot: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), snapshot.to_string());
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, snapshot: &str) -> Result<(), DomainError> {
        self.insert(key, snapshot).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
