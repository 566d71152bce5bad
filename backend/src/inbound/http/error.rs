//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting Actix
//! handlers return it directly. Every failure is translated once, at this
//! boundary, into the `{ "errors": [...] }` envelope with a status matching
//! the client category.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::domain::Error;
use crate::inbound::translation::{ClientError, ClientErrorCode, ErrorTranslator};
use crate::middleware::TRACE_ID_HEADER;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub errors: Vec<ClientError>,
}

fn status_for(code: ClientErrorCode) -> StatusCode {
    match code {
        ClientErrorCode::BadUserInput => StatusCode::BAD_REQUEST,
        ClientErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ClientErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ClientErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn translate(error: &Error) -> ClientError {
    ErrorTranslator::default().translate(error)
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(translate(self).extensions.code)
    }

    fn error_response(&self) -> HttpResponse {
        let client = translate(self);
        let mut builder = HttpResponse::build(status_for(client.extensions.code));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ErrorEnvelope {
            errors: vec![client],
        })
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests;
