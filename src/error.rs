use thiserror::Error;

/// Failures raised by the domain layer itself.
///
/// Persistence failures (uniqueness violations, connectivity) are not
/// wrapped here; repos pass them through as-is for the caller to translate.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Caller-supplied data failed a domain rule (e.g. empty password,
    /// malformed email).
    #[error("validation error: {0}")]
    Validation(String),

    /// The stored credential never round-trips; reading it is a
    /// programming error.
    #[error("password is write-only and cannot be read")]
    PasswordWriteOnly,

    /// Argon2 failed to derive a hash. Unreachable with default params.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
