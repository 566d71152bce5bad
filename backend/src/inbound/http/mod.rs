//! HTTP inbound adapter exposing REST endpoints.

pub mod articles;
pub mod comments;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
pub mod support;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

use actix_web::web;

use crate::domain::Error;

/// Register every API resource on `cfg`; mount it under `/api/v1`.
///
/// Body and query extraction failures surface as `BAD_USER_INPUT` like any
/// other validation error.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| Error::invalid_input(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| Error::invalid_input(err.to_string()).into()),
    )
    .service(users::signup)
    .service(users::login)
    .service(users::logout)
    .service(users::list_users)
    .service(users::get_user)
    .service(users::update_user)
    .service(users::delete_user)
    // `search` must precede `{id}`.
    .service(articles::search_articles)
    .service(articles::list_articles)
    .service(articles::get_article)
    .service(articles::list_article_comments)
    .service(articles::create_article)
    .service(articles::update_article)
    .service(articles::delete_article)
    .service(comments::list_comments)
    .service(comments::create_comment)
    .service(comments::get_comment)
    .service(comments::update_comment)
    .service(comments::delete_comment);
}
