//! Document identifiers.
//!
//! Every stored document is keyed by a [`DocumentId`]: a time-ordered UUID
//! minted by the store on insert. Ascending identifier order therefore equals
//! insertion order, which cursor pagination relies on. Entity-specific
//! newtypes keep user, article and comment identifiers from being mixed up at
//! compile time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors raised when parsing identifiers from client input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// The identifier was blank.
    #[error("identifier must not be empty")]
    Empty,
    /// The identifier is not a UUID.
    #[error("identifier must be a valid UUID")]
    Malformed,
}

/// Store-assigned identifier shared by every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse client input, rejecting blank or padded values.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::DocumentId;
    ///
    /// let id = DocumentId::parse("0190c9a4-0000-7000-8000-000000000001").unwrap();
    /// assert_eq!(id.to_string(), "0190c9a4-0000-7000-8000-000000000001");
    /// assert!(DocumentId::parse(" ").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, IdValidationError> {
        if raw.trim().is_empty() {
            return Err(IdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(IdValidationError::Malformed);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| IdValidationError::Malformed)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for DocumentId {
    type Err = IdValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(DocumentId);

        impl $name {
            /// Parse client input into a typed identifier.
            pub fn parse(raw: &str) -> Result<Self, IdValidationError> {
                DocumentId::parse(raw).map(Self)
            }
        }

        impl From<DocumentId> for $name {
            fn from(value: DocumentId) -> Self {
                Self(value)
            }
        }

        impl From<$name> for DocumentId {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a stored [`User`](crate::domain::User).
    UserId
);
define_entity_id!(
    /// Identifier of a stored [`Article`](crate::domain::Article).
    ArticleId
);
define_entity_id!(
    /// Identifier of a stored [`Comment`](crate::domain::Comment).
    CommentId
);
