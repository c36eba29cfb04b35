//! Typed snapshot boundary over a KeyValueStore.
//!
//! Two records: the user profile and the device list. Each write is a full
//! snapshot. Reads never fail: an unavailable backend or a malformed
//! snapshot is reported as "no data" so the caller falls back to defaults.

use crate::domain::{Device, DomainError, User};
use crate::ports::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

pub const USER_KEY: &str = "revibe_user";
pub const DEVICES_KEY: &str = "revibe_devices";

#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub async fn load_user(&self) -> Option<User> {
        self.load_snapshot(USER_KEY).await
    }

    pub async fn save_user(&self, user: &User) -> Result<(), DomainError> {
        self.save_snapshot(USER_KEY, user).await
    }

    /// Drops the user record. The device list is left untouched.
    pub async fn clear_user(&self) -> Result<(), DomainError> {
        self.backend.remove(USER_KEY).await
    }

    pub async fn load_devices(&self) -> Option<Vec<Device>> {
        self.load_snapshot(DEVICES_KEY).await
    }

    pub async fn save_devices(&self, devices: &[Device]) -> Result<(), DomainError> {
        self.save_snapshot(DEVICES_KEY, devices).await
    }

    async fn load_snapshot<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.load(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "storage unavailable, using defaults");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "malformed snapshot ignored, using defaults");
                None
            }
        }
    }

    async fn save_snapshot<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), DomainError> {
        let json = serde_json::to_string(value)
            .map_err(|e| DomainError::Store(format!("serialize {}: {}", key, e)))?;
        self.backend.save(key, &json).await
    }
}
