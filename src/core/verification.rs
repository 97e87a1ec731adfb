//! One-time e-mail verification codes.
//!
//! Codes are six digits, stored in memory per e-mail address, and valid for a
//! fixed time-to-live. Generating a new code replaces the previous one and drops
//! every expired entry. A code is consumed by a successful [`VerificationCodes::verify`]
//! (or an explicit [`VerificationCodes::consume`]) and discarded once it is found
//! expired.

use crate::errors::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct PendingCode {
    code: String,
    expires_at: DateTime<Utc>,
}

/// In-memory store of pending verification codes.
#[derive(Debug)]
pub struct VerificationCodes {
    ttl: Duration,
    pending: RwLock<HashMap<String, PendingCode>>,
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

impl VerificationCodes {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Store whose codes live for `minutes`.
    #[must_use]
    pub fn with_ttl_minutes(minutes: i64) -> Self {
        Self::new(Duration::minutes(minutes))
    }

    /// Issues a fresh code for `email`, replacing any pending one.
    pub async fn generate(&self, email: &str) -> String {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let now = Utc::now();
        let entry = PendingCode {
            code: code.clone(),
            expires_at: now + self.ttl,
        };

        let mut pending = self.pending.write().await;
        pending.retain(|_, existing| existing.expires_at >= now);
        pending.insert(normalize(email), entry);
        debug!("Issued verification code for {email}");
        code
    }

    /// Checks `code` for `email`, consuming it on success.
    ///
    /// # Errors
    /// Returns [`Error::Verification`] when no code is pending, the code has
    /// expired, or it does not match.
    pub async fn verify(&self, email: &str, code: &str) -> Result<()> {
        let key = normalize(email);
        let mut pending = self.pending.write().await;
        check_locked(&mut pending, &key, code)?;
        pending.remove(&key);
        Ok(())
    }

    /// Checks `code` for `email` without consuming it.
    ///
    /// Pair with [`VerificationCodes::consume`] once the guarded action succeeds.
    ///
    /// # Errors
    /// Same as [`VerificationCodes::verify`].
    pub async fn check(&self, email: &str, code: &str) -> Result<()> {
        let key = normalize(email);
        check_locked(&mut *self.pending.write().await, &key, code)
    }

    /// Drops the pending code for `email`.
    pub async fn consume(&self, email: &str) {
        self.pending.write().await.remove(&normalize(email));
    }
}

fn check_locked(pending: &mut HashMap<String, PendingCode>, key: &str, code: &str) -> Result<()> {
    let Some(entry) = pending.get(key) else {
        return Err(Error::Verification {
            reason: "no code was requested for this e-mail".to_string(),
        });
    };

    if Utc::now() > entry.expires_at {
        pending.remove(key);
        return Err(Error::Verification {
            reason: "the code has expired".to_string(),
        });
    }

    if entry.code != code.trim() {
        return Err(Error::Verification {
            reason: "the code is incorrect".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn test_code_is_six_digits_and_single_use() {
        let codes = VerificationCodes::with_ttl_minutes(10);
        let code = codes.generate("anna@example.com").await;
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        codes.verify("Anna@Example.com", &code).await.unwrap();
        assert!(codes.verify("anna@example.com", &code).await.is_err());
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_pending_code() {
        let codes = VerificationCodes::with_ttl_minutes(10);
        let code = codes.generate("anna@example.com").await;
        let wrong = if code == "000000" { "111111" } else { "000000" };

        assert!(matches!(
            codes.verify("anna@example.com", wrong).await,
            Err(Error::Verification { .. })
        ));
        codes.verify("anna@example.com", &code).await.unwrap();
    }

    #[tokio::test]
    async fn test_new_code_replaces_old() {
        let codes = VerificationCodes::with_ttl_minutes(10);
        let first = codes.generate("anna@example.com").await;
        let second = codes.generate("anna@example.com").await;
        if first != second {
            assert!(codes.verify("anna@example.com", &first).await.is_err());
        }
        codes.verify("anna@example.com", &second).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected_and_removed() {
        let codes = VerificationCodes::new(Duration::seconds(-1));
        let code = codes.generate("anna@example.com").await;

        let err = codes.verify("anna@example.com", &code).await.unwrap_err();
        assert!(err.to_string().contains("expired"));
        let err = codes.verify("anna@example.com", &code).await.unwrap_err();
        assert!(err.to_string().contains("no code"));
    }

    #[tokio::test]
    async fn test_check_does_not_consume() {
        let codes = VerificationCodes::with_ttl_minutes(10);
        let code = codes.generate("anna@example.com").await;

        codes.check("anna@example.com", &code).await.unwrap();
        codes.check("anna@example.com", &code).await.unwrap();
        codes.consume("Anna@example.com").await;
        assert!(codes.check("anna@example.com", &code).await.is_err());
    }

    #[tokio::test]
    async fn test_generate_prunes_expired_codes() {
        let codes = VerificationCodes::new(Duration::seconds(-1));
        codes.generate("first@example.com").await;
        codes.generate("second@example.com").await;
        codes.generate("third@example.com").await;

        let pending = codes.pending.read().await;
        assert_eq!(pending.len(), 1);
        assert!(pending.contains_key("third@example.com"));
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let codes = VerificationCodes::with_ttl_minutes(10);
        assert!(codes.verify("nobody@example.com", "123456").await.is_err());
    }
}
