//! `SeaORM` implementation of the `EntryAttemptLedger` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::EntryAttempt;
use crate::services::{AccessError, EntryAttemptLedger};

pub struct SeaOrmEntryAttemptLedger {
    store: Store,
}

impl SeaOrmEntryAttemptLedger {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EntryAttemptLedger for SeaOrmEntryAttemptLedger {
    async fn create(
        &self,
        user_id: &str,
        tag_id: &str,
        check_point_id: &str,
    ) -> Result<EntryAttempt, AccessError> {
        Ok(self
            .store
            .entry_attempt_repo()
            .insert(user_id, tag_id, check_point_id)
            .await?)
    }

    async fn get(&self, attempt_id: &str) -> Result<EntryAttempt, AccessError> {
        self.store
            .entry_attempt_repo()
            .get(attempt_id)
            .await?
            .ok_or_else(|| AccessError::not_found("Entry attempt"))
    }

    async fn resolve(&self, attempt_id: &str) -> Result<(), AccessError> {
        let exists = self
            .store
            .entry_attempt_repo()
            .mark_successful(attempt_id)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(AccessError::not_found("Entry attempt"))
        }
    }

    async fn list(&self) -> Result<Vec<EntryAttempt>, AccessError> {
        Ok(self.store.entry_attempt_repo().list().await?)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<EntryAttempt>, AccessError> {
        Ok(self.store.entry_attempt_repo().list_for_user(user_id).await?)
    }
}
