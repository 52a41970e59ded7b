use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::users;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A registered identity, as stored.
///
/// Carries the password hash and TOTP secret, so it is never serialized
/// directly; use [`UserSummary`] for responses.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub tag_id: String,
    pub totp_secret: String,
    pub totp_provisioning_uri: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<users::Model> for User {
    type Error = String;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: model.role.parse()?,
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            tag_id: model.tag_id,
            totp_secret: model.totp_secret,
            totp_provisioning_uri: model.totp_provisioning_uri,
            created_at: model.created_at,
        })
    }
}

/// Fields needed to insert a user. Secret material is already derived.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub tag_id: String,
    pub totp_secret: String,
    pub totp_provisioning_uri: String,
    pub role: Role,
}

/// Client-facing view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub tag_id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            tag_id: user.tag_id,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn summary_hides_secret_material() {
        let user = User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            tag_id: "TAG-1".to_string(),
            totp_secret: "JBSWY3DPEHPK3PXP".to_string(),
            totp_provisioning_uri: "otpauth://totp/x".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(UserSummary::from(user)).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["tagId"], "TAG-1");
        assert_eq!(obj["role"], "USER");
        assert!(!obj.contains_key("passwordHash"));
        assert!(!obj.contains_key("totpSecret"));
        assert!(!obj.contains_key("totpProvisioningUri"));
    }
}
