//! Account and user API handlers.
//!
//! ```text
//! POST   /api/v1/signup {"firstName":"Ada","lastName":"L","email":"a@x.com","password":"..."}
//! POST   /api/v1/login  {"email":"a@x.com","password":"..."}
//! POST   /api/v1/logout
//! GET    /api/v1/users?limit=&cursor=
//! GET    /api/v1/users/{id}
//! PATCH  /api/v1/users/{id}
//! DELETE /api/v1/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::PageParams;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    Error, LoginCredentials, LoginValidationError, NewUser, Role, UserId, UserPatch,
    UserValidationError, UserView, assert_owner_or_admin,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::support::{created, ok, page_envelope, page_request};

/// Signup request body.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial user update body; omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_user_validation_error(err: UserValidationError) -> Error {
    Error::invalid_input(err.to_string())
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    Error::invalid_input(err.to_string())
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::parse(raw).map_err(|_| Error::invalid_input("Invalid user id"))
}

/// Register an account and start a session for it.
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft =
        NewUser::try_from_parts(&body.first_name, &body.last_name, &body.email, &body.password)
            .map_err(map_user_validation_error)?;
    let user = state.users.signup(draft).await?;
    session.sign_in(user.id)?;
    Ok(created(user))
}

/// Authenticate and establish a session.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.users.authenticate(&credentials).await?;
    session.sign_in(user.id())?;
    info!(user_id = %user.id(), "user logged in");
    Ok(ok(UserView::from(&user)))
}

/// End the current session.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.sign_out();
    ok(true)
}

/// Page through users in creation order.
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    params: web::Query<PageParams>,
) -> ApiResult<HttpResponse> {
    let request = page_request(&params, state.default_page_size)?;
    let page = state.users.list_page(request).await?;
    Ok(ok(page_envelope(page)?))
}

/// Fetch one user.
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    Ok(ok(state.users.get_by_id(id).await?))
}

/// Update a user; only the account owner or an admin may, and only an admin
/// may change roles.
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    let principal = session.principal(&state).await?;
    assert_owner_or_admin(&principal, id)?;
    let body = payload.into_inner();
    if body.role.is_some() && !principal.is_admin() {
        return Err(Error::unauthorized("Unauthorized"));
    }
    let patch = UserPatch::try_from_parts(
        body.first_name.as_deref(),
        body.last_name.as_deref(),
        body.email.as_deref(),
        body.password.as_deref(),
        body.role,
    )
    .map_err(map_user_validation_error)?;
    Ok(ok(state.users.update(id, patch).await?))
}

/// Delete a user and everything they wrote.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    let principal = session.principal(&state).await?;
    assert_owner_or_admin(&principal, id)?;
    let removed = state.users.delete(id).await?;
    if removed && principal.identity == id {
        session.sign_out();
    }
    Ok(ok(removed))
}
