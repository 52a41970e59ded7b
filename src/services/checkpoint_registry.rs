//! Checkpoint provisioning and API-key resolution.

use crate::models::CheckPoint;
use crate::services::AccessError;

#[async_trait::async_trait]
pub trait CheckpointRegistry: Send + Sync {
    /// Registers a checkpoint under a freshly generated API key. The returned
    /// record is the only time the key leaves the service.
    async fn register(&self, name: &str) -> Result<CheckPoint, AccessError>;

    /// # Errors
    ///
    /// Returns [`AccessError::NotFound`] for an unknown key.
    async fn find_by_api_key(&self, api_key: &str) -> Result<CheckPoint, AccessError>;
}
