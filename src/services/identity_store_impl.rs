//! `SeaORM` implementation of the `IdentityStore` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::{NewUser, User};
use crate::services::error::is_unique_violation;
use crate::services::{AccessError, IdentityStore, UserLookup};

pub struct SeaOrmIdentityStore {
    store: Store,
}

impl SeaOrmIdentityStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityStore for SeaOrmIdentityStore {
    async fn create_user(&self, candidate: NewUser) -> Result<User, AccessError> {
        // Uniqueness is enforced by the indexes alone, never by a prior read.
        self.store
            .user_repo()
            .insert(candidate)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AccessError::Conflict(
                        "A user with this email or tag id already exists".to_string(),
                    )
                } else {
                    err.into()
                }
            })
    }

    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<User, AccessError> {
        let repo = self.store.user_repo();
        let user = match lookup {
            UserLookup::Id(id) => repo.get_by_id(id).await?,
            UserLookup::Email(email) => repo.get_by_email(email).await?,
            UserLookup::TagId(tag_id) => repo.get_by_tag_id(tag_id).await?,
        };

        user.ok_or_else(|| AccessError::not_found("User"))
    }

    async fn list_users(&self) -> Result<Vec<User>, AccessError> {
        Ok(self.store.user_repo().list().await?)
    }
}
