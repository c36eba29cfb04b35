//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Device, DeviceAnalysis, DomainError};

/// Durable key-value storage holding whole snapshots as serialized text.
///
/// Every write replaces the full value under the key; there are no partial updates.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when nothing is stored under `key`.
    async fn load(&self, key: &str) -> Result<Option<String>, DomainError>;

    async fn save(&self, key: &str, snapshot: &str) -> Result<(), DomainError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), DomainError>;
}

/// Structured sustainability analysis for one device.
#[async_trait::async_trait]
pub trait AnalysisPort: Send + Sync {
    /// One outbound request per call. No retry; any failure is returned as is.
    async fn analyze_device(&self, device: &Device) -> Result<DeviceAnalysis, DomainError>;
}

/// Free-text advisory answers.
#[async_trait::async_trait]
pub trait AdvisorPort: Send + Sync {
    /// Stateless per call. Never fails: implementations degrade to a canned reply.
    async fn quick_advice(&self, query: &str) -> String;
}
