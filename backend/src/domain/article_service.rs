//! Articles: authored creation, title search and their comment threads.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::article::{Article, ArticlePatch, ArticlePayload, ArticleView};
use super::comment::{Comment, CommentView};
use super::comment_service::CommentDescriptor;
use super::dependency::{ArticleDependencies, DependencyValidator, INVALID_AUTHOR};
use super::document::Collection;
use super::entity_service::{EntityDescriptor, EntityService, PageRequest, PageSlice};
use super::ports::Filter;
use super::user::User;
use super::{ArticleId, CommentId, Error, UserId};

/// Articles resolve with their author populated.
#[derive(Clone)]
pub struct ArticleDescriptor {
    users: Collection<User>,
}

impl ArticleDescriptor {
    /// Descriptor reading authors from `users`.
    pub fn new(users: Collection<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl EntityDescriptor for ArticleDescriptor {
    type Record = Article;
    type View = ArticleView;

    async fn resolve(&self, record: &Article) -> Result<ArticleView, Error> {
        let Some(author) = self.users.find(record.author()).await? else {
            warn!(
                article_id = %record.id(),
                author_id = %record.author(),
                "article author is missing"
            );
            return Err(Error::internal(INVALID_AUTHOR));
        };
        Ok(ArticleView::new(record, &author))
    }
}

/// Article operations.
pub struct ArticleService {
    entities: EntityService<ArticleDescriptor>,
    comments: EntityService<CommentDescriptor>,
    dependencies: ArticleDependencies,
}

impl ArticleService {
    /// Service over `articles`; `comments` serves article threads and the
    /// delete cascade.
    pub fn new(
        articles: Collection<Article>,
        users: Collection<User>,
        comments: Collection<Comment>,
        max_page_size: usize,
    ) -> Self {
        Self {
            entities: EntityService::new(
                articles.clone(),
                ArticleDescriptor::new(users.clone()),
                max_page_size,
            ),
            comments: EntityService::new(
                comments,
                CommentDescriptor::new(users.clone(), articles),
                max_page_size,
            ),
            dependencies: ArticleDependencies::new(users),
        }
    }

    /// Publish an article for `author`, who must exist.
    pub async fn create(
        &self,
        author: UserId,
        payload: ArticlePayload,
    ) -> Result<ArticleView, Error> {
        self.create_with(&self.dependencies, author, payload).await
    }

    /// Publish an article using a caller-supplied author check.
    pub async fn create_with<V>(
        &self,
        validator: &V,
        author: UserId,
        payload: ArticlePayload,
    ) -> Result<ArticleView, Error>
    where
        V: DependencyValidator<Claim = UserId, Resolved = User> + ?Sized,
    {
        let view = self
            .entities
            .create(validator, author, |author| payload.authored_by(&author))
            .await?;
        info!(article_id = %view.id, author_id = %author, "article created");
        Ok(view)
    }

    /// Stored article, if any.
    pub async fn find_record(&self, id: ArticleId) -> Result<Option<Article>, Error> {
        self.entities.find_record(id).await
    }

    /// One article with its author.
    pub async fn get_by_id(&self, id: ArticleId) -> Result<ArticleView, Error> {
        self.entities.get_by_id(id).await
    }

    /// Articles whose title contains `query`, ignoring case.
    ///
    /// Matching is one-directional: a stored title shorter than the query is
    /// never found, even when the query contains it.
    pub async fn get_by_title(&self, query: &str) -> Result<Vec<ArticleView>, Error> {
        debug!(query, "title search only matches titles containing the whole query");
        self.entities
            .find_all(Filter::new().contains_ignore_case("title", query))
            .await
    }

    /// Ascending page of articles.
    pub async fn list_page(
        &self,
        request: PageRequest<ArticleId>,
    ) -> Result<PageSlice<ArticleView, ArticleId>, Error> {
        self.entities.list_page(request).await
    }

    /// Ascending page of the comments on `article`, which must exist.
    pub async fn comments_for_article(
        &self,
        article: ArticleId,
        request: PageRequest<CommentId>,
    ) -> Result<PageSlice<CommentView, CommentId>, Error> {
        let article = self.entities.get_record(article).await?;
        self.comments
            .list_where(Filter::new().eq("article", article.id().to_string()), request)
            .await
    }

    /// Merge `patch` into the article.
    pub async fn update(&self, id: ArticleId, patch: &ArticlePatch) -> Result<ArticleView, Error> {
        self.entities.update(id, patch).await
    }

    /// Remove the article and every comment on it.
    pub async fn delete(&self, id: ArticleId) -> Result<bool, Error> {
        if !self.entities.delete(id).await? {
            return Ok(false);
        }
        let comments = self
            .comments
            .records()
            .delete_where(&Filter::new().eq("article", id.to_string()))
            .await?;
        info!(article_id = %id, comments = comments.deleted_count, "article deleted");
        Ok(true)
    }
}
