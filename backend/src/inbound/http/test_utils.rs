//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::{
    BlogServices, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE, MIN_PASSWORD_COST, PasswordHasher,
    Role, UserId, UserPatch,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryDocumentStore;

/// Password every helper-created account signs up with.
pub const TEST_PASSWORD: &str = "yahoo!XD123";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    session_middleware_with_key(Key::generate())
}

fn session_middleware_with_key(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Full API over a fresh in-memory store.
///
/// The app is rebuilt per call around shared state and a fixed session key,
/// so cookies issued by one call are honoured by the next.
pub struct TestApp {
    pub state: HttpState,
    key: Key,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryDocumentStore::default());
        let services = BlogServices::new(
            store,
            Arc::new(DefaultClock),
            PasswordHasher::new(MIN_PASSWORD_COST),
            DEFAULT_MAX_PAGE_SIZE,
        );
        Self {
            state: HttpState::new(services, DEFAULT_PAGE_SIZE),
            key: Key::generate(),
        }
    }

    pub async fn call(&self, request: test::TestRequest) -> ServiceResponse<BoxBody> {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(self.state.clone()))
                .wrap(Trace)
                .service(
                    web::scope("/api/v1")
                        .wrap(session_middleware_with_key(self.key.clone()))
                        .configure(configure_api),
                ),
        )
        .await;
        test::call_service(&app, request.to_request())
            .await
            .map_into_boxed_body()
    }
}

/// Read a response body as JSON.
pub async fn read_json(response: ServiceResponse<BoxBody>) -> Value {
    let bytes = test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}

fn session_cookie(response: &ServiceResponse<BoxBody>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Sign up `email` and return the created user with its session cookie.
pub async fn signup_as(app: &TestApp, email: &str) -> (Value, Cookie<'static>) {
    let response = app
        .call(test::TestRequest::post().uri("/api/v1/signup").set_json(json!({
            "firstName": "first",
            "lastName": "last",
            "email": email,
            "password": TEST_PASSWORD,
        })))
        .await;
    assert!(response.status().is_success(), "signup failed: {}", response.status());
    let cookie = session_cookie(&response);
    let body = read_json(response).await;
    (body["data"].clone(), cookie)
}

/// Log an existing account in and return its session cookie.
pub async fn login_as(app: &TestApp, email: &str) -> Cookie<'static> {
    let response = app
        .call(
            test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "email": email, "password": TEST_PASSWORD })),
        )
        .await;
    assert!(response.status().is_success(), "login failed: {}", response.status());
    session_cookie(&response)
}

/// Grant the admin role directly through the service layer.
pub async fn promote_to_admin(app: &TestApp, user: &Value) {
    let id = UserId::parse(user["id"].as_str().expect("user id")).expect("valid user id");
    let patch = UserPatch {
        role: Some(Role::Admin),
        ..UserPatch::default()
    };
    app.state.users.update(id, patch).await.expect("promote");
}
