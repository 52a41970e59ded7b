//! Error taxonomy shared by the access-control services.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccessError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// True when the database rejected a write because of a unique index.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl From<DbErr> for AccessError {
    fn from(err: DbErr) -> Self {
        if is_unique_violation(&err) {
            Self::Conflict("Resource already exists".to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<anyhow::Error> for AccessError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_db_errors_are_internal() {
        let err = AccessError::from(DbErr::Custom("boom".to_string()));
        assert!(matches!(err, AccessError::Internal(_)));
    }

    #[test]
    fn not_found_names_the_resource() {
        assert_eq!(
            AccessError::not_found("Entry attempt").to_string(),
            "Entry attempt not found"
        );
    }
}
