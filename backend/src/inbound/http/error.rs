//! HTTP mapping for domain errors.
//!
//! The domain [`Error`] stays protocol-agnostic; this module assigns status
//! codes, redacts internal failures and turns Actix extractor rejections
//! (malformed JSON, bad query strings, unparsable forms) into the same JSON
//! payload shape.

use actix_web::error::{JsonPayloadError, QueryPayloadError, UrlencodedError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Internal errors keep only their trace id; message and details stay in
/// the logs.
fn redact_if_internal(error: &Error) -> Error {
    if status_for(error.code()) != StatusCode::INTERNAL_SERVER_ERROR {
        return error.clone();
    }
    let redacted = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = ?self.code(), message = %self.message(), "request failed");
        } else if status == StatusCode::UNAUTHORIZED {
            warn!(message = %self.message(), "request not authenticated");
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header(("WWW-Authenticate", "Bearer"));
        }
        builder.json(redact_if_internal(self))
    }
}

/// Body rejection handler for `web::JsonConfig`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let detail = match &err {
        JsonPayloadError::ContentType => json!({ "code": "unsupported_content_type" }),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            json!({ "code": "payload_too_large" })
        }
        _ => json!({ "code": "malformed_json", "reason": err.to_string() }),
    };
    Error::invalid_request("request body is not valid JSON for this endpoint")
        .with_details(detail)
        .into()
}

/// Query string rejection handler for `web::QueryConfig`.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("query string could not be parsed")
        .with_details(json!({ "code": "invalid_query", "reason": err.to_string() }))
        .into()
}

/// Form rejection handler for `web::FormConfig`.
pub fn form_error_handler(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request("form body could not be parsed")
        .with_details(json!({ "code": "invalid_form", "reason": err.to_string() }))
        .into()
}
