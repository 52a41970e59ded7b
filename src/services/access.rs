//! Registration and the two-step entry protocol.
//!
//! `AccessService` owns no storage of its own. It sequences the identity
//! store, checkpoint registry, attempt ledger and TOTP engine:
//!
//! 1. `rfid_check`: a checkpoint reports a tag scan, a pending attempt is
//!    recorded and its id handed back.
//! 2. `confirm_two_fa`: the holder of that id submits a TOTP code; a valid
//!    code flips the attempt to successful.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::user::hash_password_blocking;
use crate::models::{CheckPoint, EntryAttempt, NewUser, Role, UserSummary};
use crate::services::{
    AccessError, CheckpointRegistry, EntryAttemptLedger, IdentityStore, TotpEngine, UserLookup,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub tag_id: String,
}

/// Returned once at registration; the URI is not retrievable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub totp_provisioning_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfidCheckOutcome {
    pub entry_attempt_id: String,
    pub role: Role,
}

fn is_valid_email(email: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ':' is excluded because the address doubles as the otpauth account label.
    let re = RE.get_or_init(|| {
        Regex::new(r"^[^@\s:]+@[^@\s:]+\.[^@\s:]+$").expect("Invalid regex")
    });
    re.is_match(email)
}

fn require(field: &str, value: &str) -> Result<(), AccessError> {
    if value.trim().is_empty() {
        return Err(AccessError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

pub struct AccessService {
    identities: Arc<dyn IdentityStore>,
    check_points: Arc<dyn CheckpointRegistry>,
    attempts: Arc<dyn EntryAttemptLedger>,
    totp: Arc<dyn TotpEngine>,
    security: SecurityConfig,
}

impl AccessService {
    #[must_use]
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        check_points: Arc<dyn CheckpointRegistry>,
        attempts: Arc<dyn EntryAttemptLedger>,
        totp: Arc<dyn TotpEngine>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            identities,
            check_points,
            attempts,
            totp,
            security,
        }
    }

    /// Onboards an admin or a regular user.
    ///
    /// The TOTP secret is generated here, exactly once; the provisioning URI
    /// in the result is the only copy that leaves the service.
    pub async fn register(
        &self,
        role: Role,
        request: RegistrationRequest,
    ) -> Result<Registration, AccessError> {
        require("name", &request.name)?;
        require("email", &request.email)?;
        require("password", &request.password)?;
        require("tagId", &request.tag_id)?;

        if !is_valid_email(&request.email) {
            return Err(AccessError::bad_request("email is not a valid address"));
        }

        let enrollment = self.totp.generate_secret(&request.email)?;
        let password_hash = hash_password_blocking(&request.password, &self.security).await?;

        let user = self
            .identities
            .create_user(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                tag_id: request.tag_id,
                totp_secret: enrollment.secret,
                totp_provisioning_uri: enrollment.provisioning_uri.clone(),
                role,
            })
            .await?;

        metrics::counter!("registrations_total", "role" => role.as_str()).increment(1);
        info!(user_id = %user.id, role = %role, "Registered user");

        Ok(Registration {
            id: user.id,
            totp_provisioning_uri: enrollment.provisioning_uri,
        })
    }

    pub async fn register_check_point(&self, name: &str) -> Result<CheckPoint, AccessError> {
        require("name", name)?;

        let check_point = self.check_points.register(name).await?;
        info!(check_point_id = %check_point.id, name = %check_point.name, "Registered checkpoint");
        Ok(check_point)
    }

    /// Step one: a checkpoint reports a tag scan.
    ///
    /// Unknown tags and unknown checkpoint keys are both `Unauthorized`, and
    /// no attempt is recorded for them.
    pub async fn rfid_check(
        &self,
        tag_id: &str,
        api_key: &str,
    ) -> Result<RfidCheckOutcome, AccessError> {
        require("tagId", tag_id)?;
        require("apiKey", api_key)?;

        let user = match self.identities.find_user(UserLookup::TagId(tag_id)).await {
            Ok(user) => user,
            Err(AccessError::NotFound(_)) => {
                warn!(tag_id = %tag_id, "Scan rejected: unknown tag");
                return Err(AccessError::Unauthorized);
            }
            Err(err) => return Err(err),
        };

        let check_point = match self.check_points.find_by_api_key(api_key).await {
            Ok(check_point) => check_point,
            Err(AccessError::NotFound(_)) => {
                warn!(tag_id = %tag_id, "Scan rejected: unknown checkpoint key");
                return Err(AccessError::Unauthorized);
            }
            Err(err) => return Err(err),
        };

        let attempt = self
            .attempts
            .create(&user.id, tag_id, &check_point.id)
            .await?;

        metrics::counter!("entry_attempts_created_total").increment(1);
        info!(
            attempt_id = %attempt.id,
            user_id = %user.id,
            check_point_id = %check_point.id,
            "Entry attempt created"
        );

        Ok(RfidCheckOutcome {
            entry_attempt_id: attempt.id,
            role: user.role,
        })
    }

    /// Step two: confirm a pending attempt with a TOTP code.
    ///
    /// A wrong code is `Ok(false)` and leaves the attempt untouched. The code
    /// is checked against the user recorded on the attempt.
    pub async fn confirm_two_fa(
        &self,
        entry_attempt_id: &str,
        code: &str,
    ) -> Result<bool, AccessError> {
        require("entryAttemptId", entry_attempt_id)?;
        require("totp", code)?;

        let attempt = self.attempts.get(entry_attempt_id).await?;
        let user = self
            .identities
            .find_user(UserLookup::Id(&attempt.user_id))
            .await
            .map_err(|err| match err {
                AccessError::NotFound(_) => {
                    AccessError::internal(format!("Attempt {} has no owner", attempt.id))
                }
                other => other,
            })?;

        let valid = self.totp.verify_code(&user.totp_secret, code, Utc::now())?;

        if valid {
            self.attempts.resolve(&attempt.id).await?;
            info!(attempt_id = %attempt.id, user_id = %user.id, "Entry attempt confirmed");
        } else {
            warn!(attempt_id = %attempt.id, user_id = %user.id, "TOTP code rejected");
        }

        let outcome = if valid { "success" } else { "failure" };
        metrics::counter!("two_fa_verifications_total", "outcome" => outcome).increment(1);

        Ok(valid)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, AccessError> {
        let users = self.identities.list_users().await?;
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    pub async fn list_attempts(&self) -> Result<Vec<EntryAttempt>, AccessError> {
        self.attempts.list().await
    }

    /// Attempts made with the tag of the user registered under `email`.
    pub async fn list_attempts_for(&self, email: &str) -> Result<Vec<EntryAttempt>, AccessError> {
        let user = self.identities.find_user(UserLookup::Email(email)).await?;
        self.attempts.list_for_user(&user.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TotpConfig;
    use crate::db::Store;
    use crate::services::{
        RfcTotpEngine, SeaOrmCheckpointRegistry, SeaOrmEntryAttemptLedger, SeaOrmIdentityStore,
    };
    use totp_rs::TOTP;

    async fn access_service() -> AccessService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        AccessService::new(
            Arc::new(SeaOrmIdentityStore::new(store.clone())),
            Arc::new(SeaOrmCheckpointRegistry::new(store.clone())),
            Arc::new(SeaOrmEntryAttemptLedger::new(store)),
            Arc::new(RfcTotpEngine::new(&TotpConfig::default())),
            SecurityConfig {
                argon2_memory_cost_kib: 1024,
                argon2_time_cost: 1,
                ..SecurityConfig::default()
            },
        )
    }

    fn request(email: &str, tag_id: &str) -> RegistrationRequest {
        RegistrationRequest {
            name: "Grace".to_string(),
            email: email.to_string(),
            password: "s3cret-pass".to_string(),
            tag_id: tag_id.to_string(),
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("grace@example.com"));
        assert!(!is_valid_email("grace"));
        assert!(!is_valid_email("grace@example"));
        assert!(!is_valid_email("gr:ace@example.com"));
        assert!(!is_valid_email("grace @example.com"));
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() {
        let service = access_service().await;

        let mut blank_tag = request("grace@example.com", "TAG-1");
        blank_tag.tag_id = "  ".to_string();
        assert!(matches!(
            service.register(Role::User, blank_tag).await,
            Err(AccessError::BadRequest(_))
        ));

        assert!(matches!(
            service
                .register(Role::User, request("not-an-email", "TAG-1"))
                .await,
            Err(AccessError::BadRequest(_))
        ));
        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_entry_protocol() {
        let service = access_service().await;

        let registration = service
            .register(Role::User, request("grace@example.com", "TAG-7"))
            .await
            .unwrap();
        let gate = service.register_check_point("Lobby").await.unwrap();

        let outcome = service.rfid_check("TAG-7", &gate.api_key).await.unwrap();
        assert_eq!(outcome.role, Role::User);

        let code = TOTP::from_url(&registration.totp_provisioning_uri)
            .unwrap()
            .generate_current()
            .unwrap();
        assert!(
            service
                .confirm_two_fa(&outcome.entry_attempt_id, &code)
                .await
                .unwrap()
        );

        let attempts = service.list_attempts().await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].successful);
        assert_eq!(attempts[0].user_id, registration.id);
        assert_eq!(attempts[0].check_point_id, gate.id);

        let mine = service
            .list_attempts_for("grace@example.com")
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_code_leaves_attempt_pending() {
        let service = access_service().await;

        let registration = service
            .register(Role::User, request("grace@example.com", "TAG-7"))
            .await
            .unwrap();
        let gate = service.register_check_point("Lobby").await.unwrap();
        let outcome = service.rfid_check("TAG-7", &gate.api_key).await.unwrap();

        let right = TOTP::from_url(&registration.totp_provisioning_uri)
            .unwrap()
            .generate_current()
            .unwrap();
        let wrong = if right == "000000" { "111111" } else { "000000" };

        assert!(
            !service
                .confirm_two_fa(&outcome.entry_attempt_id, wrong)
                .await
                .unwrap()
        );
        assert!(!service.list_attempts().await.unwrap()[0].successful);
    }

    #[tokio::test]
    async fn test_unknown_tag_or_key_is_unauthorized() {
        let service = access_service().await;
        service
            .register(Role::User, request("grace@example.com", "TAG-7"))
            .await
            .unwrap();
        let gate = service.register_check_point("Lobby").await.unwrap();

        assert!(matches!(
            service.rfid_check("TAG-404", &gate.api_key).await,
            Err(AccessError::Unauthorized)
        ));
        assert!(matches!(
            service.rfid_check("TAG-7", "bogus-key").await,
            Err(AccessError::Unauthorized)
        ));
        assert!(service.list_attempts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_unknown_attempt_is_not_found() {
        let service = access_service().await;
        assert!(matches!(
            service.confirm_two_fa("missing", "123456").await,
            Err(AccessError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let service = access_service().await;
        service
            .register(Role::Admin, request("grace@example.com", "TAG-1"))
            .await
            .unwrap();

        assert!(matches!(
            service
                .register(Role::User, request("grace@example.com", "TAG-2"))
                .await,
            Err(AccessError::Conflict(_))
        ));
        assert_eq!(service.list_users().await.unwrap().len(), 1);
    }
}
