//! Tests for HTTP error mapping.

use super::*;
use crate::domain::ErrorCode;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::ResponseError;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("boom")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[fixture]
fn invalid_input_case(expected_trace_id: String) -> Error {
    Error::invalid_input("Invalid author id").with_trace_id(expected_trace_id)
}

#[rstest]
#[case(Error::invalid_input("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("Invalid comment id"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthenticated("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::unauthorized("Unauthorized"), StatusCode::FORBIDDEN)]
#[case(Error::service_unavailable("down"), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_client_category(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Value {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id not valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let envelope: Value = serde_json::from_slice(&bytes).expect("error JSON");
    let errors = envelope["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 1);
    errors[0].clone()
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(
    internal_error_case: Error,
    expected_trace_id: String,
) {
    let payload = assert_error_response(
        internal_error_case,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(payload["message"], "Internal server error");
    assert_eq!(payload["extensions"]["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(payload["extensions"]["traceId"], TRACE_ID);
    assert!(payload.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn translated_errors_keep_their_message(
    invalid_input_case: Error,
    expected_trace_id: String,
) {
    let payload = assert_error_response(
        invalid_input_case,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(payload["message"], "Invalid author id");
    assert_eq!(payload["extensions"]["code"], "BAD_USER_INPUT");
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let payload = assert_error_response(
        Error::unauthorized("Unauthorized"),
        StatusCode::FORBIDDEN,
        None,
    )
    .await;

    assert_eq!(payload["extensions"]["code"], "FORBIDDEN");
    assert!(payload["extensions"].get("traceId").is_none());
}

#[rstest]
fn from_actix_error_is_redacted_internal_error() {
    use actix_web::error;

    let actix_err = error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
