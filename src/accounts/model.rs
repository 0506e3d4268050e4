use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use super::password;
use super::token::{TokenKeys, TokenPurpose};
use crate::error::DomainError;

/// Capability bits carried by `Role::permissions`.
pub mod permissions {
    pub const WRITE_ARTICLES: i32 = 0x04;
    pub const MODERATE_COMMENTS: i32 = 0x08;
    pub const ADMINISTER: i32 = 0x80;
}

/// A named permission bundle. At most one role is marked default; new
/// accounts pick it up at registration time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub is_default: bool,
    pub permissions: i32,
}

impl Role {
    pub fn has_permission(&self, flag: i32) -> bool {
        self.permissions & flag == flag
    }
}

/// A registered account. `role_id` and the counters are plain columns;
/// nothing here is an enforced relation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub confirmed: bool,
    pub member_since: OffsetDateTime,
    pub last_seen: OffsetDateTime,
    pub member_ip: Option<String>,
    pub last_ip: Option<String>,
    pub articles: i32,
    pub comments: i32,
    pub uploads: i32,
    pub homepage: Option<String>,
    pub intro: Option<String>,
    pub alias: Option<String>,
    pub role_id: Option<i64>,
}

impl Account {
    /// The credential does not round-trip; reading it always fails.
    pub fn password(&self) -> Result<&str, DomainError> {
        Err(DomainError::PasswordWriteOnly)
    }

    /// Re-derive and overwrite the stored hash. The plaintext is dropped
    /// on return.
    pub fn set_password(&mut self, plain: &str) -> Result<(), DomainError> {
        if plain.is_empty() {
            return Err(DomainError::Validation("password must not be empty".into()));
        }
        let hash =
            password::hash_password(plain).map_err(|e| DomainError::Hashing(e.to_string()))?;
        self.password_hash = Some(hash);
        Ok(())
    }

    /// False on mismatch, false when no hash has ever been set, false when
    /// the stored hash is unreadable. Never fails.
    pub fn verify_password(&self, plain: &str) -> bool {
        match &self.password_hash {
            Some(hash) => password::verify_password(plain, hash).unwrap_or(false),
            None => false,
        }
    }

    /// Exchange a confirm token for `confirmed = true`. The claim must match
    /// this account's id. The change is staged only; persist it with
    /// [`super::repo::update`]. Re-confirming an already confirmed account
    /// succeeds again.
    pub fn confirm(&mut self, keys: &TokenKeys, token: &str) -> bool {
        match keys.verify(TokenPurpose::Confirm, token) {
            Some(id) if id == self.id => {
                self.confirmed = true;
                true
            }
            _ => false,
        }
    }

    /// Exchange a reset token for a new credential. `Ok(false)` on any
    /// verification failure, leaving the account untouched; `Err` only for
    /// the validation class (empty replacement password). Staged only, like
    /// [`Account::confirm`].
    pub fn reset_password(
        &mut self,
        keys: &TokenKeys,
        token: &str,
        new_password: &str,
    ) -> Result<bool, DomainError> {
        match keys.verify(TokenPurpose::Reset, token) {
            Some(id) if id == self.id => {
                self.set_password(new_password)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use time::macros::datetime;

    fn make_keys() -> TokenKeys {
        TokenKeys::from_config(&TokenConfig {
            secret_key: "test-secret".into(),
            ttl_seconds: 3600,
        })
    }

    fn make_account(id: i64) -> Account {
        Account {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: None,
            confirmed: false,
            member_since: datetime!(2024-01-01 00:00 UTC),
            last_seen: datetime!(2024-01-01 00:00 UTC),
            member_ip: None,
            last_ip: None,
            articles: 0,
            comments: 0,
            uploads: 0,
            homepage: None,
            intro: None,
            alias: None,
            role_id: None,
        }
    }

    #[test]
    fn set_and_verify_password() {
        let mut account = make_account(1);
        account.set_password("horse-staple").expect("set");
        assert!(account.verify_password("horse-staple"));
        assert!(!account.verify_password("horse-staple "));
        assert!(!account.verify_password("something-else"));
    }

    #[test]
    fn set_password_rejects_empty_plaintext() {
        let mut account = make_account(1);
        let err = account.set_password("").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(account.password_hash.is_none());
    }

    #[test]
    fn password_is_write_only() {
        let mut account = make_account(1);
        assert!(matches!(
            account.password(),
            Err(DomainError::PasswordWriteOnly)
        ));
        account.set_password("whatever").expect("set");
        assert!(matches!(
            account.password(),
            Err(DomainError::PasswordWriteOnly)
        ));
    }

    #[test]
    fn verify_password_fails_closed_without_hash() {
        let account = make_account(1);
        assert!(!account.verify_password("anything"));
    }

    #[test]
    fn verify_password_fails_closed_on_malformed_hash() {
        let mut account = make_account(1);
        account.password_hash = Some("corrupted".into());
        assert!(!account.verify_password("anything"));
    }

    #[test]
    fn confirm_with_valid_token() {
        let keys = make_keys();
        let mut account = make_account(7);
        let token = keys.issue(TokenPurpose::Confirm, 7).expect("issue");
        assert!(account.confirm(&keys, &token));
        assert!(account.confirmed);
    }

    #[test]
    fn confirm_is_idempotent() {
        let keys = make_keys();
        let mut account = make_account(7);
        let token = keys.issue(TokenPurpose::Confirm, 7).expect("issue");
        assert!(account.confirm(&keys, &token));
        assert!(account.confirm(&keys, &token));
        assert!(account.confirmed);
    }

    #[test]
    fn confirm_rejects_token_for_another_account() {
        let keys = make_keys();
        let mut account = make_account(7);
        let token = keys.issue(TokenPurpose::Confirm, 8).expect("issue");
        assert!(!account.confirm(&keys, &token));
        assert!(!account.confirmed);
    }

    #[test]
    fn confirm_rejects_reset_token() {
        let keys = make_keys();
        let mut account = make_account(7);
        let token = keys.issue(TokenPurpose::Reset, 7).expect("issue");
        assert!(!account.confirm(&keys, &token));
        assert!(!account.confirmed);
    }

    #[test]
    fn confirm_rejects_expired_token() {
        let keys = make_keys();
        let mut account = make_account(7);
        let token = keys
            .issue_with_ttl(TokenPurpose::Confirm, 7, -5)
            .expect("issue");
        assert!(!account.confirm(&keys, &token));
        assert!(!account.confirmed);
    }

    #[test]
    fn reset_password_replaces_credential() {
        let keys = make_keys();
        let mut account = make_account(7);
        account.set_password("old-password").expect("set");
        let token = keys.issue(TokenPurpose::Reset, 7).expect("issue");
        assert!(account
            .reset_password(&keys, &token, "new-password")
            .expect("reset"));
        assert!(account.verify_password("new-password"));
        assert!(!account.verify_password("old-password"));
    }

    #[test]
    fn reset_password_rejects_invalid_token() {
        let keys = make_keys();
        let mut account = make_account(7);
        account.set_password("old-password").expect("set");
        let confirm_token = keys.issue(TokenPurpose::Confirm, 7).expect("issue");
        let foreign_token = keys.issue(TokenPurpose::Reset, 9).expect("issue");
        for token in [confirm_token.as_str(), foreign_token.as_str(), "garbage"] {
            assert!(!account
                .reset_password(&keys, token, "new-password")
                .expect("reset"));
        }
        assert!(account.verify_password("old-password"));
    }

    #[test]
    fn reset_password_rejects_empty_replacement() {
        let keys = make_keys();
        let mut account = make_account(7);
        account.set_password("old-password").expect("set");
        let token = keys.issue(TokenPurpose::Reset, 7).expect("issue");
        let err = account.reset_password(&keys, &token, "").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(account.verify_password("old-password"));
    }

    #[test]
    fn serialized_account_never_contains_the_hash() {
        let mut account = make_account(1);
        account.set_password("sup3r-secret").expect("set");
        let json = serde_json::to_string(&account).expect("serialize");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("user1@example.com"));
    }

    #[test]
    fn role_permission_bits_combine() {
        let moderator = Role {
            id: 2,
            name: "moderator".into(),
            is_default: false,
            permissions: permissions::WRITE_ARTICLES | permissions::MODERATE_COMMENTS,
        };
        assert!(moderator.has_permission(permissions::WRITE_ARTICLES));
        assert!(moderator.has_permission(permissions::MODERATE_COMMENTS));
        assert!(!moderator.has_permission(permissions::ADMINISTER));
    }
}
