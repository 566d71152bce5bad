//! Translation of domain errors into client-facing error categories.
//!
//! Clients see GraphQL-style errors: a message plus an `extensions.code`
//! category. Translation is an ordered list of [`TranslationRule`]s applied
//! by a single [`ErrorTranslator`]; the first rule whose predicate matches
//! decides the category. Anything no rule recognises is reported as an opaque
//! internal error and logged with its original message.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode};

/// Message sent in place of any untranslated failure.
pub const REDACTED_MESSAGE: &str = "Internal server error";

/// Category surfaced to clients in `extensions.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientErrorCode {
    BadUserInput,
    Unauthenticated,
    Forbidden,
    InternalServerError,
}

/// Extensions object attached to every client error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    pub code: ClientErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientError {
    pub message: String,
    pub extensions: ErrorExtensions,
}

/// Maps the domain codes accepted by `matches` onto `category`. `name` labels
/// the rule in logs.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRule {
    pub name: &'static str,
    pub matches: fn(ErrorCode) -> bool,
    pub category: ClientErrorCode,
}

impl TranslationRule {
    fn apply(&self, error: &Error) -> Option<ClientError> {
        (self.matches)(error.code()).then(|| ClientError {
            message: error.message().to_owned(),
            extensions: ErrorExtensions {
                code: self.category,
                trace_id: error.trace_id().map(str::to_owned),
            },
        })
    }
}

/// Rules in application order.
///
/// `not_found` shares the bad-input category with `invalid_input`.
pub const DEFAULT_RULES: [TranslationRule; 3] = [
    TranslationRule {
        name: "unauthenticated",
        matches: |code| code == ErrorCode::Unauthenticated,
        category: ClientErrorCode::Unauthenticated,
    },
    TranslationRule {
        name: "invalid_input",
        matches: |code| matches!(code, ErrorCode::InvalidInput | ErrorCode::NotFound),
        category: ClientErrorCode::BadUserInput,
    },
    TranslationRule {
        name: "unauthorized",
        matches: |code| code == ErrorCode::Unauthorized,
        category: ClientErrorCode::Forbidden,
    },
];

/// Applies translation rules at the transport boundary.
///
/// # Examples
/// ```
/// use blog_backend::domain::Error;
/// use blog_backend::inbound::translation::{ClientErrorCode, ErrorTranslator};
///
/// let translator = ErrorTranslator::default();
/// let client = translator.translate(&Error::unauthorized("Unauthorized"));
/// assert_eq!(client.extensions.code, ClientErrorCode::Forbidden);
/// assert_eq!(client.message, "Unauthorized");
/// ```
#[derive(Debug, Clone)]
pub struct ErrorTranslator {
    rules: Vec<TranslationRule>,
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl ErrorTranslator {
    /// Translator applying `rules` in order.
    pub fn new(rules: Vec<TranslationRule>) -> Self {
        Self { rules }
    }

    /// Client view of `error`.
    pub fn translate(&self, error: &Error) -> ClientError {
        for rule in &self.rules {
            if let Some(client) = rule.apply(error) {
                debug!(rule = rule.name, code = ?error.code(), "error translated");
                return client;
            }
        }
        error!(
            code = ?error.code(),
            message = error.message(),
            trace_id = error.trace_id(),
            "untranslated error redacted"
        );
        ClientError {
            message: REDACTED_MESSAGE.to_owned(),
            extensions: ErrorExtensions {
                code: ClientErrorCode::InternalServerError,
                trace_id: error.trace_id().map(str::to_owned),
            },
        }
    }
}
