//! Article data model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::document::Document;
use super::user::{User, UserView};
use super::{ArticleId, UserId};

/// Maximum allowed title length in characters.
pub const TITLE_MAX: usize = 200;

/// Validation errors for article input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArticleValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("content must not be empty")]
    EmptyContent,
}

/// Article headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleTitle(String);

impl ArticleTitle {
    /// Validate a title; surrounding whitespace is trimmed.
    pub fn new(raw: &str) -> Result<Self, ArticleValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(ArticleValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ArticleTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleContent(String);

impl ArticleContent {
    /// Validate article content; it must contain something besides whitespace.
    pub fn new(raw: &str) -> Result<Self, ArticleValidationError> {
        if raw.trim().is_empty() {
            return Err(ArticleValidationError::EmptyContent);
        }
        Ok(Self(raw.to_owned()))
    }
}

impl AsRef<str> for ArticleContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Stored article document. `author` is checked only when the article is
/// created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(rename = "_id")]
    id: ArticleId,
    title: ArticleTitle,
    content: ArticleContent,
    author: UserId,
}

impl Article {
    /// Stable identifier.
    pub fn id(&self) -> ArticleId {
        self.id
    }

    /// Headline.
    pub fn title(&self) -> &ArticleTitle {
        &self.title
    }

    /// Body.
    pub fn content(&self) -> &ArticleContent {
        &self.content
    }

    /// Owning author.
    pub fn author(&self) -> UserId {
        self.author
    }
}

impl Document for Article {
    type Id = ArticleId;
    type Draft = NewArticle;
    type Patch = ArticlePatch;

    const COLLECTION: &'static str = "articles";
    const NOUN: &'static str = "article";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Title and content supplied by the author, before validation of the
/// author reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePayload {
    pub title: ArticleTitle,
    pub content: ArticleContent,
}

impl ArticlePayload {
    /// Validate raw article fields.
    pub fn try_from_parts(title: &str, content: &str) -> Result<Self, ArticleValidationError> {
        Ok(Self {
            title: ArticleTitle::new(title)?,
            content: ArticleContent::new(content)?,
        })
    }

    /// Attach the resolved author.
    pub fn authored_by(self, author: &User) -> NewArticle {
        NewArticle {
            title: self.title,
            content: self.content,
            author: author.id(),
        }
    }
}

/// Insert payload for the articles collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    title: ArticleTitle,
    content: ArticleContent,
    author: UserId,
}

/// Partial article update. The author is never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<ArticleTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ArticleContent>,
}

impl ArticlePatch {
    /// Validate optional raw fields into a patch.
    pub fn try_from_parts(
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Self, ArticleValidationError> {
        Ok(Self {
            title: title.map(ArticleTitle::new).transpose()?,
            content: content.map(ArticleContent::new).transpose()?,
        })
    }
}

/// Article reference as embedded in other views (author left unresolved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub article_id: ArticleId,
    pub title: String,
    pub content: String,
    pub author: UserId,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            article_id: article.id,
            title: article.title.as_ref().to_owned(),
            content: article.content.as_ref().to_owned(),
            author: article.author,
        }
    }
}

/// Client-facing article with its author populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleView {
    pub id: ArticleId,
    pub article_id: ArticleId,
    pub title: String,
    pub content: String,
    pub author: UserView,
}

impl ArticleView {
    /// Combine a stored article with its resolved author.
    pub fn new(article: &Article, author: &User) -> Self {
        Self {
            id: article.id,
            article_id: article.id,
            title: article.title.as_ref().to_owned(),
            content: article.content.as_ref().to_owned(),
            author: UserView::from(author),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("", "body", ArticleValidationError::EmptyTitle)]
    #[case("   ", "body", ArticleValidationError::EmptyTitle)]
    #[case("title", " ", ArticleValidationError::EmptyContent)]
    fn payload_validation(
        #[case] title: &str,
        #[case] content: &str,
        #[case] expected: ArticleValidationError,
    ) {
        assert_eq!(ArticlePayload::try_from_parts(title, content), Err(expected));
    }

    #[rstest]
    fn overlong_titles_are_rejected() {
        let title = "t".repeat(TITLE_MAX + 1);
        assert_eq!(
            ArticleTitle::new(&title),
            Err(ArticleValidationError::TitleTooLong { max: TITLE_MAX })
        );
    }

    #[rstest]
    fn patch_skips_unset_fields() {
        let patch = ArticlePatch::try_from_parts(None, Some("new body")).expect("valid patch");
        assert_eq!(
            serde_json::to_value(&patch).expect("serialise patch"),
            json!({ "content": "new body" })
        );
    }

    #[rstest]
    fn stored_article_decodes() {
        let article: Article = serde_json::from_value(json!({
            "_id": "0190c9a4-0000-7000-8000-000000000002",
            "title": "Rust",
            "content": "ownership",
            "author": "0190c9a4-0000-7000-8000-000000000001",
        }))
        .expect("decode article");
        let summary = ArticleSummary::from(&article);
        assert_eq!(summary.id, summary.article_id);
        assert_eq!(article.author().to_string(), "0190c9a4-0000-7000-8000-000000000001");
    }
}
