//! Request validation helpers for inbound HTTP adapters.
//!
//! Malformed JSON and domain validation failures both become
//! `invalid_request` errors with a `details` object naming the problem.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, web};
use serde_json::json;

use crate::domain::{Error, RecordValidationError};

/// Largest accepted JSON body in bytes.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// JSON extractor configuration rendering payload errors as domain errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req: &HttpRequest| payload_error(&err).into())
}

fn payload_error(err: &JsonPayloadError) -> Error {
    let code = match err {
        JsonPayloadError::ContentType => "unsupported_content_type",
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "payload_too_large"
        }
        JsonPayloadError::Deserialize(_) => "malformed_body",
        _ => "unreadable_body",
    };
    Error::invalid_request(format!("invalid request body: {err}"))
        .with_details(json!({ "code": code }))
}

/// Map a record validation failure to an `invalid_request` error.
pub(crate) fn validation_error(err: RecordValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
    }))
}
