//! RFC 6238 one-time passwords.
//!
//! The engine holds only parameters. Secrets live with the user record and
//! are passed in on every call, so verification is a pure function of
//! `(secret, code, time)`.

use chrono::{DateTime, Utc};
use rand::TryRngCore;
use rand::rngs::OsRng;
use totp_rs::{Algorithm, Secret, TOTP};

use crate::config::TotpConfig;
use crate::services::AccessError;

/// 160-bit secrets, the RFC 4226 recommendation for SHA-1.
const SECRET_BYTES: usize = 20;

/// A newly minted secret and its enrollment URI.
#[derive(Debug, Clone)]
pub struct TotpEnrollment {
    /// Base32, unpadded
    pub secret: String,
    pub provisioning_uri: String,
}

pub trait TotpEngine: Send + Sync {
    /// Draws a secret from the OS CSPRNG and builds an `otpauth://` URI for
    /// `account_label`.
    fn generate_secret(&self, account_label: &str) -> Result<TotpEnrollment, AccessError>;

    /// Accepts codes from the current step and `skew` steps either side.
    fn verify_code(
        &self,
        secret: &str,
        submitted_code: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AccessError>;
}

pub struct RfcTotpEngine {
    issuer: String,
    digits: usize,
    step: u64,
    skew: u8,
}

impl RfcTotpEngine {
    #[must_use]
    pub fn new(config: &TotpConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            digits: config.digits,
            step: config.step_seconds,
            skew: config.skew,
        }
    }

    fn totp(&self, secret: Vec<u8>, account_label: &str) -> Result<TOTP, AccessError> {
        TOTP::new(
            Algorithm::SHA1,
            self.digits,
            self.skew,
            self.step,
            secret,
            Some(self.issuer.clone()),
            account_label.to_string(),
        )
        .map_err(|e| AccessError::internal(format!("Invalid TOTP parameters: {e}")))
    }
}

impl TotpEngine for RfcTotpEngine {
    fn generate_secret(&self, account_label: &str) -> Result<TotpEnrollment, AccessError> {
        let mut bytes = [0u8; SECRET_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AccessError::internal(format!("OS randomness unavailable: {e}")))?;

        let totp = self.totp(bytes.to_vec(), account_label)?;

        Ok(TotpEnrollment {
            secret: totp.get_secret_base32(),
            provisioning_uri: totp.get_url(),
        })
    }

    fn verify_code(
        &self,
        secret: &str,
        submitted_code: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AccessError> {
        let secret = Secret::Encoded(secret.to_string())
            .to_bytes()
            .map_err(|e| AccessError::internal(format!("Stored TOTP secret is corrupt: {e:?}")))?;

        // The label only matters for URIs.
        let totp = TOTP::new_unchecked(
            Algorithm::SHA1,
            self.digits,
            self.skew,
            self.step,
            secret,
            None,
            String::new(),
        );

        let Ok(time) = u64::try_from(at.timestamp()) else {
            return Ok(false);
        };

        Ok(totp.check(submitted_code.trim(), time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn engine() -> RfcTotpEngine {
        RfcTotpEngine::new(&TotpConfig::default())
    }

    fn code_at(uri: &str, at: DateTime<Utc>) -> String {
        let totp = TOTP::from_url(uri).unwrap();
        totp.generate(u64::try_from(at.timestamp()).unwrap())
    }

    #[test]
    fn test_generated_secret_is_160_bits() {
        let enrollment = engine().generate_secret("ada@example.com").unwrap();

        let bytes = Secret::Encoded(enrollment.secret.clone()).to_bytes().unwrap();
        assert_eq!(bytes.len(), SECRET_BYTES);

        assert!(enrollment.provisioning_uri.starts_with("otpauth://totp/"));
        assert!(enrollment.provisioning_uri.contains("EntryGate"));
        assert!(enrollment.provisioning_uri.contains(&enrollment.secret));
    }

    #[test]
    fn test_secrets_differ() {
        let e = engine();
        let a = e.generate_secret("a@example.com").unwrap();
        let b = e.generate_secret("a@example.com").unwrap();
        assert_ne!(a.secret, b.secret);
    }

    #[test]
    fn test_verify_matches_generated_code() {
        let e = engine();
        let enrollment = e.generate_secret("ada@example.com").unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let code = code_at(&enrollment.provisioning_uri, at);
        assert!(e.verify_code(&enrollment.secret, &code, at).unwrap());
    }

    #[test]
    fn test_verify_rejects_code_for_other_secret() {
        let e = engine();
        let mine = e.generate_secret("ada@example.com").unwrap();
        let theirs = e.generate_secret("bob@example.com").unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let code = code_at(&theirs.provisioning_uri, at);
        // 1 in 10^6 chance of collision; compare against the real code to rule it out.
        if code != code_at(&mine.provisioning_uri, at) {
            assert!(!e.verify_code(&mine.secret, &code, at).unwrap());
        }
    }

    #[test]
    fn test_skew_window() {
        let e = engine();
        let enrollment = e.generate_secret("ada@example.com").unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let code = code_at(&enrollment.provisioning_uri, at);

        let one_step_later = at + chrono::Duration::seconds(30);
        assert!(e.verify_code(&enrollment.secret, &code, one_step_later).unwrap());

        let three_steps_later = at + chrono::Duration::seconds(90);
        if code != code_at(&enrollment.provisioning_uri, three_steps_later)
            && code != code_at(&enrollment.provisioning_uri, at + chrono::Duration::seconds(60))
            && code != code_at(&enrollment.provisioning_uri, at + chrono::Duration::seconds(120))
        {
            assert!(!e.verify_code(&enrollment.secret, &code, three_steps_later).unwrap());
        }
    }

    #[test]
    fn test_malformed_code_is_false_not_error() {
        let e = engine();
        let enrollment = e.generate_secret("ada@example.com").unwrap();
        assert!(!e.verify_code(&enrollment.secret, "abc", Utc::now()).unwrap());
        assert!(!e.verify_code(&enrollment.secret, "", Utc::now()).unwrap());
    }

    #[test]
    fn test_corrupt_secret_is_internal() {
        let err = engine()
            .verify_code("not base32 !!!", "123456", Utc::now())
            .unwrap_err();
        assert!(matches!(err, AccessError::Internal(_)));
    }
}
