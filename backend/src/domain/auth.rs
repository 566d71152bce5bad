//! Authentication and authorisation primitives.
//!
//! Inbound adapters parse raw login payloads into [`LoginCredentials`] before
//! calling the user service, and build a [`Principal`] from the session for
//! every guarded operation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::password::PlainPassword;
use super::user::{Email, Role, User, UserValidationError};
use super::{Error, UserId};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or not an address.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised the same way signup normalises it.
/// - `password` is non-empty but is not checked against the signup policy,
///   so accounts created under an older policy can still log in.
///
/// # Examples
/// ```
/// use blog_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" A@X.com ", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "a@x.com");
/// ```
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: Email,
    password: PlainPassword,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::parse(email).map_err(|_: UserValidationError| {
            LoginValidationError::InvalidEmail
        })?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: PlainPassword::attempt(password),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password attempt.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }
}

/// Acting principal for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub identity: UserId,
    pub role: Role,
}

impl Principal {
    /// Principal acting as `user`.
    pub fn of(user: &User) -> Self {
        Self {
            identity: user.id(),
            role: user.role(),
        }
    }

    /// `true` for the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fail with `unauthorized` unless `principal` owns the resource or is an
/// admin.
///
/// # Examples
/// ```
/// use blog_backend::domain::{assert_owner_or_admin, Principal, Role, UserId};
///
/// let owner = UserId::parse("0190c9a4-0000-7000-8000-000000000001").unwrap();
/// let principal = Principal { identity: owner, role: Role::Regular };
/// assert!(assert_owner_or_admin(&principal, owner).is_ok());
/// ```
pub fn assert_owner_or_admin(principal: &Principal, owner: UserId) -> Result<(), Error> {
    if principal.is_admin() || principal.identity == owner {
        Ok(())
    } else {
        Err(Error::unauthorized("Unauthorized"))
    }
}
