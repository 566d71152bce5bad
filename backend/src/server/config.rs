//! HTTP server configuration object.

use actix_web::cookie::{Key, SameSite};
use std::net::SocketAddr;

use blog_backend::domain::PasswordHasher;
use blog_backend::settings::{AppSettings, SettingsError};

/// Resolved configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) default_page_size: usize,
    pub(crate) max_page_size: usize,
    pub(crate) hasher: PasswordHasher,
}

impl ServerConfig {
    /// Validate `settings` and load the session key.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        let (default_page_size, max_page_size) = settings.page_sizes()?;
        Ok(Self {
            key: settings.session_key()?,
            cookie_secure: settings.cookie_secure(),
            same_site: SameSite::Lax,
            bind_addr: settings.bind_addr()?,
            default_page_size,
            max_page_size,
            hasher: settings.password_hasher()?,
        })
    }
}
