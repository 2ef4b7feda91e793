// handlers/mod.rs - HTTP handlers
//
// Public: service info, health, token issue
// Protected (bearer JWT): the cat resource and whoami

pub mod auth;
pub mod cats;
pub mod health;

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};

use crate::error::ApiError;

/// Unwrap a JSON body, turning extractor rejections into API errors
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::PayloadTooLarge("Request body is too large".to_string()))
        }
        Err(JsonRejection::JsonDataError(e)) => Err(ApiError::bad_request(e.body_text())),
        Err(rejection) => Err(ApiError::invalid_json(rejection.body_text())),
    }
}

/// Path ids that are not integers can never match a row
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found("Not found."))
}
