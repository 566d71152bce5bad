//! Comments: creation against a live author and article, content edits.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::article::Article;
use super::comment::{Comment, CommentContent, CommentPatch, CommentView, NewComment};
use super::dependency::{
    CommentClaim, CommentDependencies, CommentReferences, DependencyValidator, INVALID_ARTICLE,
    INVALID_AUTHOR,
};
use super::document::Collection;
use super::entity_service::{EntityDescriptor, EntityService, PageRequest, PageSlice};
use super::user::User;
use super::{CommentId, Error};

/// Comments resolve with both author and article populated.
#[derive(Clone)]
pub struct CommentDescriptor {
    users: Collection<User>,
    articles: Collection<Article>,
}

impl CommentDescriptor {
    /// Descriptor reading references from `users` and `articles`.
    pub fn new(users: Collection<User>, articles: Collection<Article>) -> Self {
        Self { users, articles }
    }
}

#[async_trait]
impl EntityDescriptor for CommentDescriptor {
    type Record = Comment;
    type View = CommentView;

    async fn resolve(&self, record: &Comment) -> Result<CommentView, Error> {
        let Some(author) = self.users.find(record.author()).await? else {
            warn!(
                comment_id = %record.id(),
                author_id = %record.author(),
                "comment author is missing"
            );
            return Err(Error::internal(INVALID_AUTHOR));
        };
        let Some(article) = self.articles.find(record.article()).await? else {
            warn!(
                comment_id = %record.id(),
                article_id = %record.article(),
                "comment article is missing"
            );
            return Err(Error::internal(INVALID_ARTICLE));
        };
        Ok(CommentView::new(record, &author, &article))
    }
}

/// Comment operations.
pub struct CommentService {
    entities: EntityService<CommentDescriptor>,
    dependencies: CommentDependencies,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    /// Service over `comments`, timestamping with `clock`.
    pub fn new(
        comments: Collection<Comment>,
        users: Collection<User>,
        articles: Collection<Article>,
        clock: Arc<dyn Clock>,
        max_page_size: usize,
    ) -> Self {
        Self {
            entities: EntityService::new(
                comments,
                CommentDescriptor::new(users.clone(), articles.clone()),
                max_page_size,
            ),
            dependencies: CommentDependencies::new(users, articles),
            clock,
        }
    }

    /// Post a comment; the author and article must both exist.
    pub async fn create(
        &self,
        claim: CommentClaim,
        content: CommentContent,
    ) -> Result<CommentView, Error> {
        self.create_with(&self.dependencies, claim, content).await
    }

    /// Post a comment using a caller-supplied reference check.
    pub async fn create_with<V>(
        &self,
        validator: &V,
        claim: CommentClaim,
        content: CommentContent,
    ) -> Result<CommentView, Error>
    where
        V: DependencyValidator<Claim = CommentClaim, Resolved = CommentReferences> + ?Sized,
    {
        let date = self.clock.utc();
        let view = self
            .entities
            .create(validator, claim, |refs| {
                NewComment::new(content, &refs.author, &refs.article, date)
            })
            .await?;
        info!(comment_id = %view.id, article_id = %claim.article, "comment created");
        Ok(view)
    }

    /// Stored comment, if any.
    pub async fn find_record(&self, id: CommentId) -> Result<Option<Comment>, Error> {
        self.entities.find_record(id).await
    }

    /// One comment with author and article.
    pub async fn get_by_id(&self, id: CommentId) -> Result<CommentView, Error> {
        self.entities.get_by_id(id).await
    }

    /// One page of every comment, oldest first.
    pub async fn list_page(
        &self,
        request: PageRequest<CommentId>,
    ) -> Result<PageSlice<CommentView, CommentId>, Error> {
        self.entities.list_page(request).await
    }

    /// Replace the content and stamp `editedAt`; author, article and `date`
    /// are untouched.
    pub async fn update_content(
        &self,
        id: CommentId,
        content: CommentContent,
    ) -> Result<CommentView, Error> {
        let patch = CommentPatch {
            content: Some(content),
            edited_at: Some(self.clock.utc()),
        };
        self.entities.update(id, &patch).await
    }

    /// Remove one comment.
    pub async fn delete(&self, id: CommentId) -> Result<bool, Error> {
        self.entities.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::article::ArticlePayload;
    use crate::domain::user::NewUser;
    use crate::domain::{ArticleId, UserId};
    use crate::test_support::{BlogFixture, fixture_timestamp};
    use rstest::{fixture, rstest};

    #[fixture]
    fn blog() -> BlogFixture {
        BlogFixture::new()
    }

    async fn seed(blog: &BlogFixture) -> (UserId, ArticleId) {
        let draft = NewUser::try_from_parts("first", "last", "a@x.com", "yahoo!XD123")
            .expect("valid signup");
        let author = blog.users.signup(draft).await.expect("signup").id;
        let payload = ArticlePayload::try_from_parts("Rust", "ownership").expect("valid article");
        let article = blog.articles.create(author, payload).await.expect("article").id;
        (author, article)
    }

    fn content(raw: &str) -> CommentContent {
        CommentContent::new(raw).expect("valid content")
    }

    #[rstest]
    #[tokio::test]
    async fn created_comments_resolve_their_references(blog: BlogFixture) {
        let (author, article) = seed(&blog).await;

        let created = blog
            .comments
            .create(CommentClaim { author, article }, content("Great content"))
            .await
            .expect("create");
        let fetched = blog.comments.get_by_id(created.id).await.expect("fetch");

        assert_eq!(fetched.content, "Great content");
        assert_eq!(fetched.comment_id, created.id);
        assert_eq!(fetched.author.id, author);
        assert_eq!(fetched.article.id, article);
        assert_eq!(fetched.date, fixture_timestamp());
        assert_eq!(fetched.edited_at, None);
    }

    #[rstest]
    #[tokio::test]
    async fn content_edits_preserve_references_and_date(blog: BlogFixture) {
        let (author, article) = seed(&blog).await;
        let created = blog
            .comments
            .create(CommentClaim { author, article }, content("Great content"))
            .await
            .expect("create");
        blog.clock.advance_seconds(90);

        let edited = blog
            .comments
            .update_content(created.id, content("Edited content"))
            .await
            .expect("edit");

        assert_eq!(edited.content, "Edited content");
        assert_eq!(edited.author, created.author);
        assert_eq!(edited.article, created.article);
        assert_eq!(edited.date, created.date);
        assert_eq!(edited.edited_at, Some(fixture_timestamp() + chrono::TimeDelta::seconds(90)));
    }

    #[rstest]
    #[tokio::test]
    async fn comments_page_across_articles_in_creation_order(blog: BlogFixture) {
        let (author, first) = seed(&blog).await;
        let payload = ArticlePayload::try_from_parts("Tokio", "tasks").expect("valid article");
        let second = blog.articles.create(author, payload).await.expect("article").id;
        let posts = [
            (first, "first comment"),
            (second, "second comment"),
            (first, "third comment"),
        ];
        for (article, body) in posts {
            blog.comments
                .create(CommentClaim { author, article }, content(body))
                .await
                .expect("create");
        }

        let head = blog.comments.list_page(PageRequest::first(2)).await.expect("first page");
        let after = head.next_after.expect("more comments");
        let tail = blog
            .comments
            .list_page(PageRequest::after(2, after))
            .await
            .expect("second page");

        let bodies: Vec<_> = head
            .items
            .iter()
            .chain(&tail.items)
            .map(|comment| comment.content.as_str())
            .collect();
        assert_eq!(bodies, ["first comment", "second comment", "third comment"]);
        assert_eq!(tail.items[0].article.id, first);
        assert!(tail.next_after.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn editing_a_deleted_comment_is_not_found(blog: BlogFixture) {
        let (author, article) = seed(&blog).await;
        let created = blog
            .comments
            .create(CommentClaim { author, article }, content("Great content"))
            .await
            .expect("create");
        assert!(blog.comments.delete(created.id).await.expect("delete"));
        assert!(!blog.comments.delete(created.id).await.expect("delete again"));

        let err = blog
            .comments
            .update_content(created.id, content("Edited content"))
            .await
            .expect_err("gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Invalid comment id");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_article_is_named(blog: BlogFixture) {
        let (author, article) = seed(&blog).await;
        assert!(blog.articles.delete(article).await.expect("delete"));

        let err = blog
            .comments
            .create(CommentClaim { author, article }, content("Great content"))
            .await
            .expect_err("article missing");
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.message(), INVALID_ARTICLE);
    }
}
