//! Server settings loaded via OrthoConfig from CLI flags, `BLOG_*`
//! environment variables and configuration files.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroize;

use crate::domain::{
    DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_PASSWORD_COST, MAX_PASSWORD_COST,
    MIN_PASSWORD_COST, PasswordHasher,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// Shortest accepted session key file, in bytes.
pub const SESSION_KEY_MIN_LEN: usize = 64;

/// Errors raised while validating settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("page sizes must satisfy 1 <= default ({default}) <= max ({max})")]
    PageSize { default: usize, max: usize },
    #[error("password cost {cost} outside {min}..={max}")]
    PasswordCost { cost: u32, min: u32, max: u32 },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Settings for the blog server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOG")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Page size when a list request omits `limit`.
    pub default_page_size: Option<usize>,
    /// Largest `limit` a list request may ask for.
    pub max_page_size: Option<usize>,
    /// File holding the cookie signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`. Secure unless explicitly disabled.
    pub cookie_secure: Option<bool>,
    /// Fall back to a random per-process session key when the key file is
    /// unreadable. Always allowed in debug builds.
    pub allow_ephemeral_session: Option<bool>,
    /// bcrypt cost for password hashes.
    pub password_cost: Option<u32>,
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    /// `(default, max)` page sizes, validated against each other.
    pub fn page_sizes(&self) -> Result<(usize, usize), SettingsError> {
        let default = self.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let max = self.max_page_size.unwrap_or(DEFAULT_MAX_PAGE_SIZE);
        if default == 0 || default > max {
            return Err(SettingsError::PageSize { default, max });
        }
        Ok((default, max))
    }

    /// Whether session cookies carry the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or_else(|| {
            warn!("BLOG_COOKIE_SECURE not set; defaulting to secure");
            true
        })
    }

    /// Whether an unreadable key file may fall back to a temporary key.
    pub fn allow_ephemeral_session(&self) -> bool {
        self.allow_ephemeral_session.unwrap_or(false)
    }

    /// Password hasher at the configured bcrypt cost.
    pub fn password_hasher(&self) -> Result<PasswordHasher, SettingsError> {
        let cost = self.password_cost.unwrap_or(DEFAULT_PASSWORD_COST);
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&cost) {
            return Err(SettingsError::PasswordCost {
                cost,
                min: MIN_PASSWORD_COST,
                max: MAX_PASSWORD_COST,
            });
        }
        Ok(PasswordHasher::new(cost))
    }

    /// Path of the session key file.
    pub fn session_key_path(&self) -> &Path {
        self.session_key_file
            .as_deref()
            .unwrap_or_else(|| Path::new(SESSION_KEY_DEFAULT_PATH))
    }

    /// Load the session signing key.
    ///
    /// An unreadable key file yields an ephemeral key in debug builds or when
    /// `allow_ephemeral_session` is set; sessions then do not survive a
    /// restart.
    pub fn session_key(&self) -> Result<Key, SettingsError> {
        let path = self.session_key_path();
        match std::fs::read(path) {
            Ok(mut bytes) => {
                let length = bytes.len();
                if length < SESSION_KEY_MIN_LEN {
                    bytes.zeroize();
                    return Err(SettingsError::KeyTooShort {
                        path: path.to_path_buf(),
                        length,
                        min_len: SESSION_KEY_MIN_LEN,
                    });
                }
                let key = Key::derive_from(&bytes);
                bytes.zeroize();
                Ok(key)
            }
            Err(source) if cfg!(debug_assertions) || self.allow_ephemeral_session() => {
                warn!(path = %path.display(), error = %source, "using temporary session key");
                Ok(Key::generate())
            }
            Err(source) => Err(SettingsError::KeyRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
