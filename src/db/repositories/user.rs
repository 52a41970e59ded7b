use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;
use crate::models::user::{NewUser, User};

fn into_user(model: users::Model) -> Result<User, DbErr> {
    User::try_from(model).map_err(DbErr::Custom)
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts a user under a fresh id.
    ///
    /// Duplicate emails and tag ids are rejected by the unique indexes, so the
    /// returned `DbErr` carries `SqlErr::UniqueConstraintViolation` in that case.
    pub async fn insert(&self, user: NewUser) -> Result<User, DbErr> {
        let active = users::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            tag_id: Set(user.tag_id),
            totp_secret: Set(user.totp_secret),
            totp_provisioning_uri: Set(user.totp_provisioning_uri),
            role: Set(user.role.as_str().to_string()),
            created_at: Set(chrono::Utc::now()),
        };

        into_user(active.insert(&self.conn).await?)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, DbErr> {
        users::Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await?
            .map(into_user)
            .transpose()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?
            .map(into_user)
            .transpose()
    }

    pub async fn get_by_tag_id(&self, tag_id: &str) -> Result<Option<User>, DbErr> {
        users::Entity::find()
            .filter(users::Column::TagId.eq(tag_id))
            .one(&self.conn)
            .await?
            .map(into_user)
            .transpose()
    }

    pub async fn list(&self) -> Result<Vec<User>, DbErr> {
        users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(into_user)
            .collect()
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the argon2 crate defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// `hash_password` on the blocking pool.
pub async fn hash_password_blocking(password: &str, config: &SecurityConfig) -> Result<String> {
    let password = password.to_string();
    let config = config.clone();
    task::spawn_blocking(move || hash_password(&password, Some(&config)))
        .await
        .context("Password hashing task panicked")?
}

/// Constant-time comparison of `password` against a stored PHC string.
/// Parameters are read from the hash itself.
pub async fn verify_password(password_hash: &str, password: &str) -> Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password_blocking("hunter22", &cheap_params())
            .await
            .unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "hunter22").await.unwrap());
        assert!(!verify_password(&hash, "hunter23").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("not-a-phc-string", "x").await.is_err());
    }
}
