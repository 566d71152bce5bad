//! Comment API handlers.
//!
//! ```text
//! GET    /api/v1/comments?limit=&cursor=
//! POST   /api/v1/comments {"article":"<article id>","content":"...","author":"<optional user id>"}
//! GET    /api/v1/comments/{id}
//! PATCH  /api/v1/comments/{id} {"content":"..."}
//! DELETE /api/v1/comments/{id}
//! ```
//!
//! Comments on one article are listed under `/articles/{id}/comments`.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageParams;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CommentClaim, CommentContent, CommentId, CommentValidationError, Error, assert_owner_or_admin,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::articles::parse_article_id;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::support::{created, ok, page_envelope, page_request};
use crate::inbound::http::users::parse_user_id;

/// Body for posting a comment.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub article: String,
    pub content: String,
    /// Defaults to the logged-in user.
    #[serde(default)]
    pub author: Option<String>,
}

/// Comment edit body. Only the content can change.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

fn map_comment_validation_error(err: CommentValidationError) -> Error {
    Error::invalid_input(err.to_string())
}

fn parse_comment_id(raw: &str) -> Result<CommentId, Error> {
    CommentId::parse(raw).map_err(|_| Error::invalid_input("Invalid comment id"))
}

/// Post a comment on an article.
#[post("/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCommentRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state).await?;
    let body = payload.into_inner();
    let author = match body.author.as_deref() {
        Some(raw) => parse_user_id(raw).map_err(|_| Error::invalid_input("Invalid author id"))?,
        None => principal.identity,
    };
    assert_owner_or_admin(&principal, author)?;
    let claim = CommentClaim {
        author,
        article: parse_article_id(&body.article)?,
    };
    let content = CommentContent::new(&body.content).map_err(map_comment_validation_error)?;
    Ok(created(state.comments.create(claim, content).await?))
}

/// Page through every comment in creation order.
#[get("/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    params: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let request = page_request(&params, state.default_page_size)?;
    let page = state.comments.list_page(request).await?;
    Ok(ok(page_envelope(page)?))
}

/// Fetch one comment.
#[get("/comments/{id}")]
pub async fn get_comment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_comment_id(&path)?;
    Ok(ok(state.comments.get_by_id(id).await?))
}

/// Edit a comment's content; owner or admin only.
#[patch("/comments/{id}")]
pub async fn update_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateCommentRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_comment_id(&path)?;
    let principal = session.principal(&state).await?;
    let comment = state
        .comments
        .find_record(id)
        .await?
        .ok_or_else(|| Error::not_found("Invalid comment id"))?;
    assert_owner_or_admin(&principal, comment.author())?;
    let content = CommentContent::new(&payload.content).map_err(map_comment_validation_error)?;
    Ok(ok(state.comments.update_content(id, content).await?))
}

/// Delete a comment; owner or admin only.
#[delete("/comments/{id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_comment_id(&path)?;
    let principal = session.principal(&state).await?;
    let Some(comment) = state.comments.find_record(id).await? else {
        return Ok(ok(false));
    };
    assert_owner_or_admin(&principal, comment.author())?;
    Ok(ok(state.comments.delete(id).await?))
}
