//! Cookie session carrying the signed-in user's id.
//!
//! Only the id is stored. [`SessionContext::principal`] reloads the account
//! on every call, so role changes and deletions apply to live sessions.

use actix_session::{Session, SessionExt as _};
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::{debug, warn};

use crate::domain::{Error, Principal, UserId};
use crate::inbound::http::state::HttpState;

const USER_ID_KEY: &str = "user_id";

/// Message returned when a mutation arrives without a usable session.
pub const LOGIN_REQUIRED: &str = "You must be logged in";

/// Session of the current request.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Start a session for `user_id`, rotating the cookie.
    pub fn sign_in(&self, user_id: UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|err| Error::internal(format!("failed to persist session: {err}")))
    }

    /// End the session.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    fn user_id(&self) -> Option<UserId> {
        match self.0.get::<UserId>(USER_ID_KEY) {
            Ok(user_id) => user_id,
            Err(err) => {
                warn!(error = %err, "discarding unreadable session");
                self.sign_out();
                None
            }
        }
    }

    /// Account behind the session, loaded fresh.
    ///
    /// Fails with `unauthenticated` when nobody is signed in or the account
    /// has since been deleted; a stale session is dropped.
    pub async fn principal(&self, state: &HttpState) -> Result<Principal, Error> {
        let user_id = self
            .user_id()
            .ok_or_else(|| Error::unauthenticated(LOGIN_REQUIRED))?;
        let Some(user) = state.users.find_record(user_id).await? else {
            debug!(%user_id, "session refers to a deleted account");
            self.sign_out();
            return Err(Error::unauthenticated(LOGIN_REQUIRED));
        };
        Ok(Principal::of(&user))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.get_session())))
    }
}
