//! Opaque cursor tokens and the page envelope used by list endpoints.
//!
//! A [`Cursor`] wraps the key of the last item a client has seen. It travels
//! as URL-safe base64 of its JSON encoding, so clients treat it as an opaque
//! string and servers can change the key shape without breaking links.
//!
//! ```
//! use pagination::{Cursor, Page};
//!
//! let token = Cursor::new(42_u64).encode().unwrap();
//! let page = Page::new(vec!["a", "b"], Some(token.clone()));
//! assert_eq!(Cursor::<u64>::decode(&token).unwrap().into_key(), 42);
//! assert!(!page.is_last());
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while encoding or decoding a cursor token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The token was blank.
    #[error("cursor must not be empty")]
    Empty,
    /// The token was not URL-safe base64.
    #[error("cursor is not valid base64")]
    Encoding,
    /// The token did not hold a key of the expected shape.
    #[error("cursor payload is malformed: {message}")]
    Payload {
        /// Decoder diagnostic.
        message: String,
    },
}

/// Position after the last item a client received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Cursor positioned after `key`.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Take the key.
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Encode as an opaque URL-safe token.
    ///
    /// # Errors
    /// Returns [`CursorError::Payload`] when the key cannot be serialised.
    pub fn encode(&self) -> Result<String, CursorError> {
        let json = serde_json::to_vec(self).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Decode a token produced by [`Cursor::encode`].
    ///
    /// # Errors
    /// Returns a [`CursorError`] describing why the token was rejected.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CursorError::Empty);
        }
        let json = URL_SAFE_NO_PAD
            .decode(trimmed)
            .map_err(|_| CursorError::Encoding)?;
        serde_json::from_slice(&json).map_err(|err| CursorError::Payload {
            message: err.to_string(),
        })
    }
}

/// One page of results and the token for the next page, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in ascending key order.
    pub items: Vec<T>,
    /// Token resuming after the last item; `None` on the last page.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Envelope around `items`.
    pub const fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    /// `true` when no further page follows.
    pub const fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Query parameters accepted by list endpoints (`?limit=&cursor=`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    /// Requested page size.
    pub limit: Option<usize>,
    /// Token from a previous page.
    pub cursor: Option<String>,
}

impl PageParams {
    /// Requested page size, or `default` when absent.
    pub fn limit_or(&self, default: usize) -> usize {
        self.limit.unwrap_or(default)
    }

    /// Decode the cursor key, if a cursor was supplied.
    ///
    /// # Errors
    /// Returns a [`CursorError`] when the token is present but invalid.
    pub fn after<K: DeserializeOwned>(&self) -> Result<Option<K>, CursorError> {
        self.cursor
            .as_deref()
            .map(|token| Cursor::<K>::decode(token).map(Cursor::into_key))
            .transpose()
    }
}
