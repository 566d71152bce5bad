//! Article API handlers.
//!
//! ```text
//! GET    /api/v1/articles?limit=&cursor=
//! GET    /api/v1/articles/search?title=
//! GET    /api/v1/articles/{id}
//! GET    /api/v1/articles/{id}/comments?limit=&cursor=
//! POST   /api/v1/articles {"title":"...","content":"...","author":"<optional user id>"}
//! PATCH  /api/v1/articles/{id}
//! DELETE /api/v1/articles/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageParams;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ArticleId, ArticlePatch, ArticlePayload, ArticleValidationError, Error, assert_owner_or_admin,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::support::{created, ok, page_envelope, page_request};
use crate::inbound::http::users::parse_user_id;

/// Body for publishing an article.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: String,
    pub content: String,
    /// Defaults to the logged-in user.
    #[serde(default)]
    pub author: Option<String>,
}

/// Partial article update.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// `?title=` search query.
#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

fn map_article_validation_error(err: ArticleValidationError) -> Error {
    Error::invalid_input(err.to_string())
}

pub(crate) fn parse_article_id(raw: &str) -> Result<ArticleId, Error> {
    ArticleId::parse(raw).map_err(|_| Error::invalid_input("Invalid article id"))
}

/// Page through articles in creation order.
#[get("/articles")]
pub async fn list_articles(
    state: web::Data<HttpState>,
    params: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let request = page_request(&params, state.default_page_size)?;
    let page = state.articles.list_page(request).await?;
    Ok(ok(page_envelope(page)?))
}

/// Articles whose title contains the query.
#[get("/articles/search")]
pub async fn search_articles(
    state: web::Data<HttpState>,
    query: web::Query<TitleQuery>,
) -> ApiResult<HttpResponse> {
    Ok(ok(state.articles.get_by_title(&query.title).await?))
}

/// Fetch one article.
#[get("/articles/{id}")]
pub async fn get_article(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_article_id(&path)?;
    Ok(ok(state.articles.get_by_id(id).await?))
}

/// Page through the comments on one article.
#[get("/articles/{id}/comments")]
pub async fn list_article_comments(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    params: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let id = parse_article_id(&path)?;
    let request = page_request(&params, state.default_page_size)?;
    let page = state.articles.comments_for_article(id, request).await?;
    Ok(ok(page_envelope(page)?))
}

/// Publish an article. Only admins may publish on behalf of someone else.
#[post("/articles")]
pub async fn create_article(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateArticleRequest>,
) -> ApiResult<HttpResponse> {
    let principal = session.principal(&state).await?;
    let body = payload.into_inner();
    let author = match body.author.as_deref() {
        Some(raw) => parse_user_id(raw).map_err(|_| Error::invalid_input("Invalid author id"))?,
        None => principal.identity,
    };
    assert_owner_or_admin(&principal, author)?;
    let article = ArticlePayload::try_from_parts(&body.title, &body.content)
        .map_err(map_article_validation_error)?;
    Ok(created(state.articles.create(author, article).await?))
}

/// Edit an article; owner or admin only.
#[patch("/articles/{id}")]
pub async fn update_article(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateArticleRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_article_id(&path)?;
    let principal = session.principal(&state).await?;
    let article = state
        .articles
        .find_record(id)
        .await?
        .ok_or_else(|| Error::not_found("Invalid article id"))?;
    assert_owner_or_admin(&principal, article.author())?;
    let body = payload.into_inner();
    let patch = ArticlePatch::try_from_parts(body.title.as_deref(), body.content.as_deref())
        .map_err(map_article_validation_error)?;
    Ok(ok(state.articles.update(id, &patch).await?))
}

/// Delete an article and its comments; owner or admin only.
///
/// Deleting an unknown article reports `false`.
#[delete("/articles/{id}")]
pub async fn delete_article(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_article_id(&path)?;
    let principal = session.principal(&state).await?;
    let Some(article) = state.articles.find_record(id).await? else {
        return Ok(ok(false));
    };
    assert_owner_or_admin(&principal, article.author())?;
    Ok(ok(state.articles.delete(id).await?))
}
