//! Wiring of the entity services over one document store.

use std::sync::Arc;

use mockable::Clock;

use super::article_service::ArticleService;
use super::comment_service::CommentService;
use super::document::Collection;
use super::password::PasswordHasher;
use super::ports::DocumentStore;
use super::user_service::UserService;

/// The three entity services sharing one store handle.
pub struct BlogServices {
    pub users: UserService,
    pub articles: ArticleService,
    pub comments: CommentService,
}

impl BlogServices {
    /// Build every service over `store`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use blog_backend::domain::{BlogServices, DEFAULT_MAX_PAGE_SIZE, PasswordHasher};
    /// use blog_backend::outbound::memory::InMemoryDocumentStore;
    /// use mockable::DefaultClock;
    ///
    /// let services = BlogServices::new(
    ///     Arc::new(InMemoryDocumentStore::default()),
    ///     Arc::new(DefaultClock),
    ///     PasswordHasher::default(),
    ///     DEFAULT_MAX_PAGE_SIZE,
    /// );
    /// # let _ = services.users;
    /// ```
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        hasher: PasswordHasher,
        max_page_size: usize,
    ) -> Self {
        let users = Collection::new(Arc::clone(&store));
        let articles = Collection::new(Arc::clone(&store));
        let comments = Collection::new(store);
        Self {
            users: UserService::new(
                users.clone(),
                articles.clone(),
                comments.clone(),
                hasher,
                max_page_size,
            ),
            articles: ArticleService::new(
                articles.clone(),
                users.clone(),
                comments.clone(),
                max_page_size,
            ),
            comments: CommentService::new(comments, users, articles, clock, max_page_size),
        }
    }
}
