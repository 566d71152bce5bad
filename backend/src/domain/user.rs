//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::document::Document;
use super::password::{PasswordHash, PasswordValidationError, PlainPassword};
use super::user_service::EMAIL_TAKEN;
use super::{Error, UserId};

/// Maximum allowed length for first and last names.
pub const NAME_MAX: usize = 64;

/// Validation errors for user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    NameTooLong { field: &'static str, max: usize },
    #[error("email address is not valid")]
    InvalidEmail,
    #[error(transparent)]
    Password(#[from] PasswordValidationError),
}

/// Authorisation role carried by every user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Regular,
    Admin,
}

/// First or last name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    fn parse(field: &'static str, raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName { field });
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field,
                max: NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Validate a first name.
    pub fn first(raw: &str) -> Result<Self, UserValidationError> {
        Self::parse("first name", raw)
    }

    /// Validate a last name.
    pub fn last(raw: &str) -> Result<Self, UserValidationError> {
        Self::parse("last name", raw)
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Normalised (trimmed, lower-cased) email address; unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::Email;
    ///
    /// let email = Email::parse("  Ahmed@Gmail.com ").unwrap();
    /// assert_eq!(email.as_ref(), "ahmed@gmail.com");
    /// assert!(Email::parse("radomText").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let normalised = raw.trim().to_lowercase();
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Stored user document.
///
/// ## Invariants
/// - `email` is unique across the users collection.
/// - `password` only ever holds a bcrypt hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    id: UserId,
    first_name: PersonName,
    last_name: PersonName,
    email: Email,
    password: PasswordHash,
    #[serde(default)]
    role: Role,
}

impl User {
    /// Stable identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Given name.
    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Family name.
    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Unique email address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Stored password hash.
    pub fn password(&self) -> &PasswordHash {
        &self.password
    }

    /// Authorisation role.
    pub fn role(&self) -> Role {
        self.role
    }
}

impl Document for User {
    type Id = UserId;
    type Draft = UserDraft;
    type Patch = UserChanges;

    const COLLECTION: &'static str = "users";
    const NOUN: &'static str = "user";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn id(&self) -> Self::Id {
        self.id
    }

    fn duplicate(_field: &str) -> Error {
        Error::invalid_input(EMAIL_TAKEN)
    }
}

/// Validated signup payload. The password is hashed by the service before
/// anything reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    first_name: PersonName,
    last_name: PersonName,
    email: Email,
    password: PlainPassword,
}

impl NewUser {
    /// Validate raw signup fields.
    pub fn try_from_parts(
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, UserValidationError> {
        let password = PlainPassword::new(password)?;
        Ok(Self {
            first_name: PersonName::first(first_name)?,
            last_name: PersonName::last(last_name)?,
            email: Email::parse(email)?,
            password,
        })
    }

    /// Email the account will be registered under.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password awaiting hashing.
    pub fn password(&self) -> &PlainPassword {
        &self.password
    }

    /// Stored form of the account. New accounts always start with
    /// [`Role::Regular`].
    pub fn into_draft(self, password: PasswordHash) -> UserDraft {
        UserDraft {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password,
            role: Role::Regular,
        }
    }
}

/// User document as inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    first_name: PersonName,
    last_name: PersonName,
    email: Email,
    password: PasswordHash,
    role: Role,
}

/// Partial user update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub email: Option<Email>,
    pub password: Option<PlainPassword>,
    pub role: Option<Role>,
}

impl UserPatch {
    /// Validate optional raw fields into a patch.
    pub fn try_from_parts(
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        role: Option<Role>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            first_name: first_name.map(PersonName::first).transpose()?,
            last_name: last_name.map(PersonName::last).transpose()?,
            email: email.map(Email::parse).transpose()?,
            password: password.map(PlainPassword::new).transpose()?,
            role,
        })
    }

    /// Stored form of the patch, with `password` already hashed.
    pub fn into_changes(self, password: Option<PasswordHash>) -> UserChanges {
        UserChanges {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password,
            role: self.role,
        }
    }
}

/// Fields merged into a stored user; only the set ones are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<PersonName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<PersonName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<PasswordHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

/// Client-facing projection of a user; never exposes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    /// Always equal to `id`.
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_id: user.id,
            first_name: user.first_name.as_ref().to_owned(),
            last_name: user.last_name.as_ref().to_owned(),
            email: user.email.as_ref().to_owned(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests;
