use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::config::TokenConfig;

/// What a token may be exchanged for. A confirm token never verifies as a
/// reset token and vice versa.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Confirm,
    Reset,
}

/// Signed claims: one account id bound to one purpose, with an expiry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    pub sub: i64,
    pub iat: usize,
    pub exp: usize,
    pub purpose: TokenPurpose,
}

/// Signing and verification keys derived from the process-wide secret.
/// Rotating the secret invalidates every outstanding token.
#[derive(Clone)]
pub struct TokenKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl TokenKeys {
    pub fn from_config(cfg: &TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret_key.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret_key.as_bytes()),
            ttl: Duration::from_secs(cfg.ttl_seconds.max(0) as u64),
        }
    }

    /// Issue a token for `account_id` with the configured TTL.
    pub fn issue(&self, purpose: TokenPurpose, account_id: i64) -> anyhow::Result<String> {
        self.issue_with_ttl(purpose, account_id, self.ttl.as_secs() as i64)
    }

    pub fn issue_with_ttl(
        &self,
        purpose: TokenPurpose,
        account_id: i64,
        ttl_seconds: i64,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(ttl_seconds);
        let claims = TokenClaims {
            sub: account_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            purpose,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(account_id, purpose = ?purpose, "token issued");
        Ok(token)
    }

    /// Fails closed: a bad signature, an expired token, an undecodable
    /// payload or a purpose mismatch all yield `None`. Callers must still
    /// compare the returned id against the account they are checking.
    pub fn verify(&self, purpose: TokenPurpose, token: &str) -> Option<i64> {
        let mut validation = Validation::default();
        // Exact TTL; the default 60s leeway would keep freshly expired
        // tokens alive.
        validation.leeway = 0;
        validation.validate_aud = false;
        let data = match decode::<TokenClaims>(token, &self.decoding, &validation) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "token rejected");
                return None;
            }
        };
        if data.claims.purpose != purpose {
            warn!(
                expected = ?purpose,
                got = ?data.claims.purpose,
                "token purpose mismatch"
            );
            return None;
        }
        Some(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> TokenKeys {
        TokenKeys::from_config(&TokenConfig {
            secret_key: "test-secret".into(),
            ttl_seconds: 3600,
        })
    }

    #[test]
    fn issue_and_verify_confirm_token() {
        let keys = make_keys();
        let token = keys.issue(TokenPurpose::Confirm, 7).expect("issue");
        assert_eq!(keys.verify(TokenPurpose::Confirm, &token), Some(7));
    }

    #[test]
    fn purposes_are_not_interchangeable() {
        let keys = make_keys();
        let confirm = keys.issue(TokenPurpose::Confirm, 7).expect("issue confirm");
        let reset = keys.issue(TokenPurpose::Reset, 7).expect("issue reset");
        assert_eq!(keys.verify(TokenPurpose::Reset, &confirm), None);
        assert_eq!(keys.verify(TokenPurpose::Confirm, &reset), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys();
        let token = keys
            .issue_with_ttl(TokenPurpose::Confirm, 7, -5)
            .expect("issue");
        assert_eq!(keys.verify(TokenPurpose::Confirm, &token), None);
    }

    #[tokio::test]
    async fn token_expires_after_its_ttl() {
        let keys = make_keys();
        let token = keys
            .issue_with_ttl(TokenPurpose::Confirm, 7, 1)
            .expect("issue");
        assert_eq!(keys.verify(TokenPurpose::Confirm, &token), Some(7));
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert_eq!(keys.verify(TokenPurpose::Confirm, &token), None);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = make_keys();
        let token = keys.issue(TokenPurpose::Confirm, 7).expect("issue");
        let mut tampered = token.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).expect("utf8");
        assert_eq!(keys.verify(TokenPurpose::Confirm, &tampered), None);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let keys = make_keys();
        let other = TokenKeys::from_config(&TokenConfig {
            secret_key: "rotated-secret".into(),
            ttl_seconds: 3600,
        });
        let token = other.issue(TokenPurpose::Confirm, 7).expect("issue");
        assert_eq!(keys.verify(TokenPurpose::Confirm, &token), None);
    }

    #[test]
    fn garbage_input_is_rejected() {
        let keys = make_keys();
        assert_eq!(keys.verify(TokenPurpose::Confirm, "not-a-token"), None);
        assert_eq!(keys.verify(TokenPurpose::Reset, ""), None);
    }
}
