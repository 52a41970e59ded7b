//! Entry attempts and their one-way `pending -> successful` transition.

use crate::models::EntryAttempt;
use crate::services::AccessError;

#[async_trait::async_trait]
pub trait EntryAttemptLedger: Send + Sync {
    /// Records a pending attempt stamped with the current time.
    async fn create(
        &self,
        user_id: &str,
        tag_id: &str,
        check_point_id: &str,
    ) -> Result<EntryAttempt, AccessError>;

    /// # Errors
    ///
    /// Returns [`AccessError::NotFound`] for unknown or malformed ids.
    async fn get(&self, attempt_id: &str) -> Result<EntryAttempt, AccessError>;

    /// Marks the attempt successful. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotFound`] for unknown ids.
    async fn resolve(&self, attempt_id: &str) -> Result<(), AccessError>;

    /// All attempts, oldest first.
    async fn list(&self) -> Result<Vec<EntryAttempt>, AccessError>;

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<EntryAttempt>, AccessError>;
}
