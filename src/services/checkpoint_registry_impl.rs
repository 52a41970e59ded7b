//! `SeaORM` implementation of the `CheckpointRegistry` trait.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::db::Store;
use crate::models::CheckPoint;
use crate::services::{AccessError, CheckpointRegistry};

const API_KEY_BYTES: usize = 32;

/// 256 random bits, URL-safe base64.
pub fn generate_api_key() -> Result<String, AccessError> {
    let mut bytes = [0u8; API_KEY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AccessError::internal(format!("OS randomness unavailable: {e}")))?;
    Ok(URL_SAFE.encode(bytes))
}

pub struct SeaOrmCheckpointRegistry {
    store: Store,
}

impl SeaOrmCheckpointRegistry {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CheckpointRegistry for SeaOrmCheckpointRegistry {
    async fn register(&self, name: &str) -> Result<CheckPoint, AccessError> {
        let api_key = generate_api_key()?;
        Ok(self.store.check_point_repo().insert(name, &api_key).await?)
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<CheckPoint, AccessError> {
        self.store
            .check_point_repo()
            .get_by_api_key(api_key)
            .await?
            .ok_or_else(|| AccessError::not_found("Checkpoint"))
    }
}
