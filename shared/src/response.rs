use lambda_http::{http::StatusCode, Body, Response};
use serde::Serialize;

use crate::error::ApiError;

/// Serialize `body` into a JSON response with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<Body>, ApiError> {
    Ok(envelope(status, serde_json::to_string(body)?)?)
}

pub fn ok<T: Serialize>(body: &T) -> Result<Response<Body>, ApiError> {
    json_response(StatusCode::OK, body)
}

pub(crate) fn envelope(
    status: StatusCode,
    body: String,
) -> Result<Response<Body>, lambda_http::http::Error> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body.into())
}
