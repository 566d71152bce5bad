//! Reference checks run before dependent documents are written.
//!
//! A validator turns the identifiers a caller *claims* into the entities they
//! name, or fails with `invalid_input`. Validation and the subsequent insert
//! are separate store calls; a referenced document deleted between the two is
//! not detected.

use async_trait::async_trait;

use super::article::Article;
use super::document::Collection;
use super::user::User;
use super::{ArticleId, Error, UserId};

/// Message raised when a claimed author does not exist.
pub const INVALID_AUTHOR: &str = "Invalid author id";
/// Message raised when a claimed article does not exist.
pub const INVALID_ARTICLE: &str = "Invalid article id";

/// Resolve claimed references, failing before anything is persisted.
#[async_trait]
pub trait DependencyValidator: Send + Sync {
    /// Identifiers supplied by the caller.
    type Claim: Send;
    /// Entities the claim resolved to.
    type Resolved: Send;

    /// Look up every claimed reference.
    async fn validate(&self, claim: Self::Claim) -> Result<Self::Resolved, Error>;
}

/// Validator for documents without references (user signup).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDependencies;

#[async_trait]
impl DependencyValidator for NoDependencies {
    type Claim = ();
    type Resolved = ();

    async fn validate(&self, _claim: ()) -> Result<(), Error> {
        Ok(())
    }
}

/// Checks the author of a new article.
#[derive(Clone)]
pub struct ArticleDependencies {
    users: Collection<User>,
}

impl ArticleDependencies {
    /// Validator reading from `users`.
    pub fn new(users: Collection<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl DependencyValidator for ArticleDependencies {
    type Claim = UserId;
    type Resolved = User;

    async fn validate(&self, author: UserId) -> Result<User, Error> {
        self.users
            .find(author)
            .await?
            .ok_or_else(|| Error::invalid_input(INVALID_AUTHOR))
    }
}

/// References claimed by a new comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentClaim {
    pub author: UserId,
    pub article: ArticleId,
}

/// Resolved comment references.
#[derive(Debug, Clone)]
pub struct CommentReferences {
    pub author: User,
    pub article: Article,
}

/// Checks the author and parent article of a new comment.
#[derive(Clone)]
pub struct CommentDependencies {
    users: Collection<User>,
    articles: Collection<Article>,
}

impl CommentDependencies {
    /// Validator reading from `users` and `articles`.
    pub fn new(users: Collection<User>, articles: Collection<Article>) -> Self {
        Self { users, articles }
    }
}

#[async_trait]
impl DependencyValidator for CommentDependencies {
    type Claim = CommentClaim;
    type Resolved = CommentReferences;

    async fn validate(&self, claim: CommentClaim) -> Result<CommentReferences, Error> {
        let author = self
            .users
            .find(claim.author)
            .await?
            .ok_or_else(|| Error::invalid_input(INVALID_AUTHOR))?;
        let article = self
            .articles
            .find(claim.article)
            .await?
            .ok_or_else(|| Error::invalid_input(INVALID_ARTICLE))?;
        Ok(CommentReferences { author, article })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockDocumentStore;
    use rstest::rstest;
    use serde_json::{Value, json};

    const AUTHOR: &str = "0190c9a4-0000-7000-8000-000000000001";
    const ARTICLE: &str = "0190c9a4-0000-7000-8000-000000000002";

    fn stored(collection: &str) -> Value {
        match collection {
            "users" => json!({
                "_id": AUTHOR,
                "firstName": "first",
                "lastName": "last",
                "email": "a@x.com",
                "password": "00$00",
            }),
            _ => json!({
                "_id": ARTICLE,
                "title": "Rust",
                "content": "ownership",
                "author": AUTHOR,
            }),
        }
    }

    fn store_with(existing: &'static [&'static str]) -> Arc<MockDocumentStore> {
        let mut store = MockDocumentStore::new();
        store.expect_find_one().returning(move |collection, _| {
            Ok(existing
                .iter()
                .any(|name| *name == collection)
                .then(|| stored(collection)))
        });
        Arc::new(store)
    }

    fn claim() -> CommentClaim {
        CommentClaim {
            author: UserId::parse(AUTHOR).expect("valid id"),
            article: ArticleId::parse(ARTICLE).expect("valid id"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn article_validator_resolves_existing_author() {
        let store = store_with(&["users"]);
        let validator = ArticleDependencies::new(Collection::new(store));

        let author = validator
            .validate(UserId::parse(AUTHOR).expect("valid id"))
            .await
            .expect("author exists");
        assert_eq!(author.id().to_string(), AUTHOR);
    }

    #[rstest]
    #[tokio::test]
    async fn article_validator_rejects_unknown_author() {
        let store = store_with(&[]);
        let validator = ArticleDependencies::new(Collection::new(store));

        let err = validator
            .validate(UserId::parse(AUTHOR).expect("valid id"))
            .await
            .expect_err("author missing");
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.message(), INVALID_AUTHOR);
    }

    #[rstest]
    #[case(&["users", "articles"], None)]
    #[case(&["articles"], Some(INVALID_AUTHOR))]
    #[case(&["users"], Some(INVALID_ARTICLE))]
    #[case(&[], Some(INVALID_AUTHOR))]
    #[tokio::test]
    async fn comment_validator_names_the_missing_reference(
        #[case] existing: &'static [&'static str],
        #[case] expected: Option<&'static str>,
    ) {
        let store = store_with(existing);
        let validator = CommentDependencies::new(
            Collection::new(store.clone()),
            Collection::new(store),
        );

        match (validator.validate(claim()).await, expected) {
            (Ok(resolved), None) => {
                assert_eq!(resolved.author.id(), claim().author);
                assert_eq!(resolved.article.id(), claim().article);
            }
            (Err(err), Some(message)) => {
                assert_eq!(err.code(), ErrorCode::InvalidInput);
                assert_eq!(err.message(), message);
            }
            (outcome, _) => panic!("unexpected outcome: {outcome:?}"),
        }
    }
}
