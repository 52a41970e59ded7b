//! Persistence seam for users.

use crate::models::{NewUser, User};
use crate::services::AccessError;

/// How to select a single user.
#[derive(Debug, Clone, Copy)]
pub enum UserLookup<'a> {
    Id(&'a str),
    Email(&'a str),
    TagId(&'a str),
}

#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    /// Inserts a user.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Conflict`] if the email or tag id is already
    /// registered. Nothing is written in that case.
    async fn create_user(&self, candidate: NewUser) -> Result<User, AccessError>;

    /// # Errors
    ///
    /// Returns [`AccessError::NotFound`] if no user matches.
    async fn find_user(&self, lookup: UserLookup<'_>) -> Result<User, AccessError>;

    async fn list_users(&self) -> Result<Vec<User>, AccessError>;
}
