//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable against the in-memory store.

use std::sync::Arc;

use crate::domain::{ArticleService, BlogServices, CommentService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<UserService>,
    pub articles: Arc<ArticleService>,
    pub comments: Arc<CommentService>,
    /// Page size used when a list request omits `limit`.
    pub default_page_size: usize,
}

impl HttpState {
    /// Wrap the domain services for sharing across workers.
    pub fn new(services: BlogServices, default_page_size: usize) -> Self {
        Self {
            users: Arc::new(services.users),
            articles: Arc::new(services.articles),
            comments: Arc::new(services.comments),
            default_page_size,
        }
    }
}
