//! Comment data model.
//!
//! Comments belong to one article and one author. Content is bounded on both
//! create and edit; an edit touches only `content` and `editedAt`, never the
//! author, article or creation `date`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::article::{Article, ArticleSummary};
use super::document::Document;
use super::user::{User, UserView};
use super::{ArticleId, CommentId, UserId};

/// Minimum comment length in characters.
pub const COMMENT_MIN: usize = 5;
/// Maximum comment length in characters.
pub const COMMENT_MAX: usize = 2000;

/// Validation errors for comment content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentValidationError {
    #[error("comment must be at least {min} characters")]
    TooShort { min: usize },
    #[error("comment must be at most {max} characters")]
    TooLong { max: usize },
}

/// Length-checked comment body.
///
/// # Examples
/// ```
/// use blog_backend::domain::CommentContent;
///
/// assert!(CommentContent::new("Great content").is_ok());
/// assert!(CommentContent::new("Yay!").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentContent(String);

impl CommentContent {
    /// Validate the trimmed length against [`COMMENT_MIN`] and
    /// [`COMMENT_MAX`].
    pub fn new(raw: &str) -> Result<Self, CommentValidationError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if length < COMMENT_MIN {
            return Err(CommentValidationError::TooShort { min: COMMENT_MIN });
        }
        if length > COMMENT_MAX {
            return Err(CommentValidationError::TooLong { max: COMMENT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommentContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Stored comment document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    id: CommentId,
    content: CommentContent,
    author: UserId,
    article: ArticleId,
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edited_at: Option<DateTime<Utc>>,
}

impl Comment {
    /// Stable identifier.
    pub fn id(&self) -> CommentId {
        self.id
    }

    /// Body.
    pub fn content(&self) -> &CommentContent {
        &self.content
    }

    /// Author reference.
    pub fn author(&self) -> UserId {
        self.author
    }

    /// Parent article reference.
    pub fn article(&self) -> ArticleId {
        self.article
    }

    /// Creation timestamp.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Timestamp of the last content edit.
    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        self.edited_at
    }
}

impl Document for Comment {
    type Id = CommentId;
    type Draft = NewComment;
    type Patch = CommentPatch;

    const COLLECTION: &'static str = "comments";
    const NOUN: &'static str = "comment";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Insert payload for the comments collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    content: CommentContent,
    author: UserId,
    article: ArticleId,
    date: DateTime<Utc>,
}

impl NewComment {
    /// Build a comment from resolved references.
    pub fn new(
        content: CommentContent,
        author: &User,
        article: &Article,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            content,
            author: author.id(),
            article: article.id(),
            date,
        }
    }
}

/// Content edit. Both fields are written together by the comment service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<CommentContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

/// Client-facing comment with author and article populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    /// Always equal to `id`.
    pub comment_id: CommentId,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    pub author: UserView,
    pub article: ArticleSummary,
}

impl CommentView {
    /// Combine a stored comment with its resolved references.
    pub fn new(comment: &Comment, author: &User, article: &Article) -> Self {
        Self {
            id: comment.id,
            comment_id: comment.id,
            content: comment.content.as_ref().to_owned(),
            date: comment.date,
            edited_at: comment.edited_at,
            author: UserView::from(author),
            article: ArticleSummary::from(article),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("Yay!", Err(CommentValidationError::TooShort { min: COMMENT_MIN }))]
    #[case("t", Err(CommentValidationError::TooShort { min: COMMENT_MIN }))]
    #[case("  abc   ", Err(CommentValidationError::TooShort { min: COMMENT_MIN }))]
    #[case("Great content", Ok(()))]
    #[case("yoyoyoyoyoyoyoyoyo", Ok(()))]
    fn content_length_bounds(
        #[case] raw: &str,
        #[case] expected: Result<(), CommentValidationError>,
    ) {
        assert_eq!(CommentContent::new(raw).map(|_| ()), expected);
    }

    #[rstest]
    fn content_upper_bound_is_inclusive() {
        assert!(CommentContent::new(&"c".repeat(COMMENT_MAX)).is_ok());
        assert_eq!(
            CommentContent::new(&"c".repeat(COMMENT_MAX + 1)),
            Err(CommentValidationError::TooLong { max: COMMENT_MAX })
        );
    }

    #[rstest]
    fn unedited_comments_decode_without_edited_at() {
        let comment: Comment = serde_json::from_value(json!({
            "_id": "0190c9a4-0000-7000-8000-000000000003",
            "content": "Great content",
            "author": "0190c9a4-0000-7000-8000-000000000001",
            "article": "0190c9a4-0000-7000-8000-000000000002",
            "date": "2024-07-01T12:00:00Z",
        }))
        .expect("decode comment");
        assert_eq!(comment.edited_at(), None);
        assert_eq!(comment.content().as_ref(), "Great content");
    }

    #[rstest]
    fn content_only_patch_omits_references() {
        let patch = CommentPatch {
            content: Some(CommentContent::new("Edited content").expect("valid")),
            edited_at: None,
        };
        assert_eq!(
            serde_json::to_value(&patch).expect("serialise patch"),
            json!({ "content": "Edited content" })
        );
    }
}
