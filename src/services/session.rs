//! Admin sessions as signed, self-contained tokens.
//!
//! Tokens are HS256 JWTs carrying the admin's email, role, and expiry. No
//! server-side session table exists; validity is signature plus `exp`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SecurityConfig;
use crate::db::repositories::user::{hash_password, verify_password};
use crate::models::{Role, User};
use crate::services::{AccessError, IdentityStore, UserLookup};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Admin email
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub name: String,
    pub email: String,
}

pub struct SessionAuthority {
    identities: Arc<dyn IdentityStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    /// Verified against when the email is unknown.
    dummy_hash: String,
}

impl SessionAuthority {
    /// Hashes a throwaway password with `security`'s Argon2 params once.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        secret: &str,
        ttl: Duration,
        security: &SecurityConfig,
    ) -> anyhow::Result<Self> {
        let dummy_hash = hash_password("entrygate-unknown-account", Some(security))?;

        Ok(Self {
            identities,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            dummy_hash,
        })
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Checks admin credentials and issues a token.
    ///
    /// Unknown emails, wrong passwords, and non-admin accounts are all
    /// reported as [`AccessError::Unauthorized`], each after one password
    /// verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminSession, AccessError> {
        let user = match self.identities.find_user(UserLookup::Email(email)).await {
            Ok(user) => user,
            Err(AccessError::NotFound(_)) => {
                verify_password(&self.dummy_hash, password).await?;
                debug!(email = %email, "Login for unknown email");
                return Err(AccessError::Unauthorized);
            }
            Err(err) => return Err(err),
        };

        if !verify_password(&user.password_hash, password).await? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AccessError::Unauthorized);
        }

        if user.role != Role::Admin {
            warn!(user_id = %user.id, "Login refused for non-admin account");
            return Err(AccessError::Unauthorized);
        }

        let token = self.issue(&user)?;
        info!(user_id = %user.id, "Admin logged in");

        Ok(AdminSession {
            token,
            name: user.name,
            email: user.email,
        })
    }

    pub fn issue(&self, user: &User) -> Result<String, AccessError> {
        let iat = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims {
            sub: user.email.clone(),
            role: user.role,
            iat,
            exp: iat.saturating_add(ttl),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AccessError::internal(format!("Failed to sign session token: {e}")))
    }

    /// Verifies signature and expiry with zero leeway.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, AccessError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "Rejected session token");
                AccessError::Unauthorized
            })?;

        if data.claims.role != Role::Admin {
            return Err(AccessError::Unauthorized);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::db::Store;
    use crate::db::repositories::user::hash_password_blocking;
    use crate::models::NewUser;
    use crate::services::SeaOrmIdentityStore;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn cheap_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    async fn authority_with_users() -> SessionAuthority {
        authority_with_params(&cheap_params()).await
    }

    async fn authority_with_params(params: &SecurityConfig) -> SessionAuthority {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let identities: Arc<dyn IdentityStore> = Arc::new(SeaOrmIdentityStore::new(store));

        for (email, tag, role) in [
            ("root@example.com", "TAG-ROOT", Role::Admin),
            ("guest@example.com", "TAG-GUEST", Role::User),
        ] {
            identities
                .create_user(NewUser {
                    name: email.to_string(),
                    email: email.to_string(),
                    password_hash: hash_password_blocking("correct horse", params)
                        .await
                        .unwrap(),
                    tag_id: tag.to_string(),
                    totp_secret: "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP".to_string(),
                    totp_provisioning_uri: "otpauth://totp/EntryGate:x".to_string(),
                    role,
                })
                .await
                .unwrap();
        }

        SessionAuthority::new(identities, SECRET, Duration::from_secs(24 * 3600), params).unwrap()
    }

    async fn fastest_rejection(authority: &SessionAuthority, email: &str) -> Duration {
        let mut fastest = Duration::MAX;
        for _ in 0..3 {
            let started = Instant::now();
            let result = authority.login(email, "not the password").await;
            assert!(matches!(result, Err(AccessError::Unauthorized)));
            fastest = fastest.min(started.elapsed());
        }
        fastest
    }

    #[tokio::test]
    async fn test_admin_login_issues_valid_token() {
        let authority = authority_with_users().await;

        let session = authority
            .login("root@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(session.email, "root@example.com");

        let claims = authority.validate(&session.token).unwrap();
        assert_eq!(claims.sub, "root@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn test_login_failures_are_unauthorized() {
        let authority = authority_with_users().await;

        for (email, password) in [
            ("root@example.com", "wrong"),
            ("nobody@example.com", "correct horse"),
            ("guest@example.com", "correct horse"),
        ] {
            assert!(matches!(
                authority.login(email, password).await,
                Err(AccessError::Unauthorized)
            ));
        }
    }

    #[tokio::test]
    async fn test_rejected_logins_all_verify_a_password() {
        let params = SecurityConfig {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            ..SecurityConfig::default()
        };
        let authority = authority_with_params(&params).await;

        let wrong_password = fastest_rejection(&authority, "root@example.com").await;
        let unknown_email = fastest_rejection(&authority, "nobody@example.com").await;
        let non_admin = fastest_rejection(&authority, "guest@example.com").await;

        // Without a verification pass these paths finish in microseconds.
        for (path, elapsed) in [("unknown email", unknown_email), ("non-admin", non_admin)] {
            assert!(
                elapsed * 4 >= wrong_password,
                "{path} rejection took {elapsed:?}, wrong password took {wrong_password:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_tampered_and_foreign_tokens_rejected() {
        let authority = authority_with_users().await;
        let session = authority
            .login("root@example.com", "correct horse")
            .await
            .unwrap();

        let mut tampered = session.token.clone();
        tampered.push('x');
        assert!(authority.validate(&tampered).is_err());
        assert!(authority.validate("garbage").is_err());

        let other = SessionAuthority::new(
            Arc::clone(&authority.identities),
            "another-secret-another-secret-xx",
            Duration::from_secs(60),
            &cheap_params(),
        )
        .unwrap();
        assert!(other.validate(&session.token).is_err());
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let authority = authority_with_users().await;
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "root@example.com".to_string(),
            role: Role::Admin,
            iat: now - 120,
            exp: now - 60,
        };
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &authority.encoding_key)
                .unwrap();

        assert!(matches!(
            authority.validate(&token),
            Err(AccessError::Unauthorized)
        ));
    }
}
