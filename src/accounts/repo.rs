use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;

use super::model::{permissions, Account, Role};
use crate::error::DomainError;

/// Roles seeded into every installation. Exactly one is the default.
pub const DEFAULT_ROLES: &[(&str, i32, bool)] = &[
    ("user", permissions::WRITE_ARTICLES, true),
    (
        "moderator",
        permissions::WRITE_ARTICLES | permissions::MODERATE_COMMENTS,
        false,
    ),
    ("administrator", permissions::ADMINISTER, false),
];

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Create an account. Uniqueness of username and email is left to the
/// store; a violation surfaces as the underlying `sqlx::Error`.
pub async fn create(
    db: &PgPool,
    username: &str,
    email: &str,
    password_hash: Option<&str>,
    ip: Option<&str>,
) -> anyhow::Result<Account> {
    if username.is_empty() {
        return Err(DomainError::Validation("username must not be empty".into()).into());
    }
    if !is_valid_email(email) {
        return Err(DomainError::Validation(format!("invalid email: {email}")).into());
    }
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO users (username, email, password_hash, member_ip, last_ip)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING id, username, email, password_hash, confirmed, member_since,
                  last_seen, member_ip, last_ip, articles, comments, uploads,
                  homepage, intro, alias, role_id
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(ip)
    .fetch_one(db)
    .await?;
    info!(account_id = account.id, username, "account created");
    Ok(account)
}

/// Identity resolution for the surrounding framework.
pub async fn load_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, username, email, password_hash, confirmed, member_since,
               last_seen, member_ip, last_ip, articles, comments, uploads,
               homepage, intro, alias, role_id
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(account)
}

pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, username, email, password_hash, confirmed, member_since,
               last_seen, member_ip, last_ip, articles, comments, uploads,
               homepage, intro, alias, role_id
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;
    Ok(account)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, username, email, password_hash, confirmed, member_since,
               last_seen, member_ip, last_ip, articles, comments, uploads,
               homepage, intro, alias, role_id
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(account)
}

/// Persist staged changes (confirm, reset_password, profile edits) as one
/// unit of work.
pub async fn update(db: &PgPool, account: &Account) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET username = $2, email = $3, password_hash = $4, confirmed = $5,
            last_seen = $6, member_ip = $7, last_ip = $8, articles = $9,
            comments = $10, uploads = $11, homepage = $12, intro = $13,
            alias = $14, role_id = $15
        WHERE id = $1
        "#,
    )
    .bind(account.id)
    .bind(&account.username)
    .bind(&account.email)
    .bind(&account.password_hash)
    .bind(account.confirmed)
    .bind(account.last_seen)
    .bind(&account.member_ip)
    .bind(&account.last_ip)
    .bind(account.articles)
    .bind(account.comments)
    .bind(account.uploads)
    .bind(&account.homepage)
    .bind(&account.intro)
    .bind(&account.alias)
    .bind(account.role_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Activity ping: stamp `last_seen` and commit immediately, unlike the
/// staged confirm/reset paths.
pub async fn ping(db: &PgPool, account: &mut Account) -> anyhow::Result<()> {
    account.last_seen = OffsetDateTime::now_utc();
    sqlx::query("UPDATE users SET last_seen = $1 WHERE id = $2")
        .bind(account.last_seen)
        .bind(account.id)
        .execute(db)
        .await?;
    Ok(())
}

/// Load, add one, commit. Its own unit of work; concurrent callers can
/// lose updates (accepted, see DESIGN.md).
pub async fn add_article(db: &PgPool, account_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT articles FROM users WHERE id = $1")
        .bind(account_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE users SET articles = $1 WHERE id = $2")
        .bind(current + 1)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn add_comment(db: &PgPool, account_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT comments FROM users WHERE id = $1")
        .bind(account_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE users SET comments = $1 WHERE id = $2")
        .bind(current + 1)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn add_upload(db: &PgPool, account_id: i64) -> anyhow::Result<()> {
    let current = sqlx::query_scalar::<_, i32>("SELECT uploads FROM users WHERE id = $1")
        .bind(account_id)
        .fetch_one(db)
        .await?;
    sqlx::query("UPDATE users SET uploads = $1 WHERE id = $2")
        .bind(current + 1)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Upsert the fixed role set by name. Re-running refreshes permissions and
/// the default flag instead of inserting duplicates.
pub async fn seed_roles(db: &PgPool) -> anyhow::Result<()> {
    for (name, perms, is_default) in DEFAULT_ROLES.iter().copied() {
        sqlx::query(
            r#"
            INSERT INTO roles (name, permissions, is_default)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE
            SET permissions = EXCLUDED.permissions,
                is_default = EXCLUDED.is_default
            "#,
        )
        .bind(name)
        .bind(perms)
        .bind(is_default)
        .execute(db)
        .await?;
        info!(role = name, permissions = perms, "role ensured");
    }
    Ok(())
}

pub async fn find_default_role(db: &PgPool) -> anyhow::Result<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, is_default, permissions FROM roles WHERE is_default LIMIT 1",
    )
    .fetch_optional(db)
    .await?;
    Ok(role)
}

pub async fn find_role_by_name(db: &PgPool, name: &str) -> anyhow::Result<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, is_default, permissions FROM roles WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("reader@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn exactly_one_default_role() {
        let defaults = DEFAULT_ROLES.iter().filter(|(_, _, d)| *d).count();
        assert_eq!(defaults, 1);
    }

    #[test]
    fn seeded_role_names_are_distinct() {
        let mut names: Vec<&str> = DEFAULT_ROLES.iter().map(|(n, _, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_ROLES.len());
    }

    #[test]
    fn administrator_is_not_default() {
        let (_, perms, is_default) = DEFAULT_ROLES
            .iter()
            .copied()
            .find(|(n, _, _)| *n == "administrator")
            .expect("administrator role");
        assert_eq!(perms, permissions::ADMINISTER);
        assert!(!is_default);
    }
}
