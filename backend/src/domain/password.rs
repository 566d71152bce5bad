//! Password handling.
//!
//! Plaintext passwords only live inside [`PlainPassword`], which zeroes its
//! buffer on drop. Storage sees a [`PasswordHash`]: a bcrypt string carrying
//! its own cost and salt. [`PasswordHasher`] runs bcrypt on the blocking
//! thread pool so request handlers never stall the async workers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use zeroize::Zeroizing;

use super::Error;

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted password length in bytes; bcrypt ignores anything past it.
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Cost applied when none is configured.
pub const DEFAULT_PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;
/// Cheapest cost bcrypt accepts.
pub const MIN_PASSWORD_COST: u32 = 4; // mirrors bcrypt's private `MIN_COST`
/// Most expensive cost bcrypt accepts.
pub const MAX_PASSWORD_COST: u32 = 31; // mirrors bcrypt's private `MAX_COST`

const BCRYPT_HASH_LEN: usize = 60;

/// Validation errors for password input and stored hashes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordValidationError {
    /// The password is shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    /// The password is longer than [`PASSWORD_MAX_BYTES`].
    #[error("password must be at most {max} bytes")]
    TooLong { max: usize },
    /// A stored hash is not a bcrypt string.
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Caller-supplied password, zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(Zeroizing<String>);

impl PlainPassword {
    /// Validate a new password for signup or a password change.
    pub fn new(raw: &str) -> Result<Self, PasswordValidationError> {
        if raw.chars().count() < PASSWORD_MIN {
            return Err(PasswordValidationError::TooShort { min: PASSWORD_MIN });
        }
        if raw.len() > PASSWORD_MAX_BYTES {
            return Err(PasswordValidationError::TooLong {
                max: PASSWORD_MAX_BYTES,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Wrap a login attempt without applying the signup policy.
    #[must_use]
    pub fn attempt(raw: &str) -> Self {
        Self(Zeroizing::new(raw.to_owned()))
    }

    fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(***)")
    }
}

/// bcrypt hash as persisted in the users collection.
///
/// # Examples
/// ```
/// use blog_backend::domain::{MIN_PASSWORD_COST, PasswordHash, PlainPassword};
///
/// let password = PlainPassword::new("yahoo!XD123").unwrap();
/// let hash = PasswordHash::derive(&password, MIN_PASSWORD_COST).unwrap();
/// assert!(hash.verify(&password));
/// assert!(!hash.verify(&PlainPassword::attempt("wrong")));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash `password` at `cost` with a fresh salt. Blocks for the duration
    /// of the key stretch; async callers go through [`PasswordHasher`].
    pub fn derive(password: &PlainPassword, cost: u32) -> Result<Self, bcrypt::BcryptError> {
        bcrypt::hash(password.expose(), cost).map(Self)
    }

    /// Check `candidate` against the stored hash. Blocking, like
    /// [`PasswordHash::derive`].
    #[must_use]
    pub fn verify(&self, candidate: &PlainPassword) -> bool {
        bcrypt::verify(candidate.expose(), &self.0).unwrap_or(false)
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

impl TryFrom<String> for PasswordHash {
    type Error = PasswordValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.len() == BCRYPT_HASH_LEN && value.starts_with("$2") {
            Ok(Self(value))
        } else {
            Err(PasswordValidationError::MalformedHash)
        }
    }
}

impl From<PasswordHash> for String {
    fn from(value: PasswordHash) -> Self {
        value.0
    }
}

/// Hashes and verifies passwords off the async executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Hasher using bcrypt `cost`, clamped to the range bcrypt accepts.
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_PASSWORD_COST, MAX_PASSWORD_COST),
        }
    }

    /// Configured bcrypt cost.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` on the blocking pool.
    pub async fn hash(&self, password: PlainPassword) -> Result<PasswordHash, Error> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || PasswordHash::derive(&password, cost))
            .await
            .map_err(|err| hashing_failed(&err))?
            .map_err(|err| hashing_failed(&err))
    }

    /// Verify `candidate` against `stored` on the blocking pool.
    pub async fn verify(
        &self,
        stored: PasswordHash,
        candidate: PlainPassword,
    ) -> Result<bool, Error> {
        tokio::task::spawn_blocking(move || stored.verify(&candidate))
            .await
            .map_err(|err| hashing_failed(&err))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_COST)
    }
}

fn hashing_failed(err: &dyn std::error::Error) -> Error {
    error!(error = %err, "password hashing failed");
    Error::internal("Internal server error")
}
