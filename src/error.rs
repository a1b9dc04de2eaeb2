use std::fmt::Display;

use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

/// `{"error": "..."}` body returned by the JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

pub type JsonError = (StatusCode, Json<ErrorBody>);

pub fn json_error(status: StatusCode, message: impl Into<String>) -> JsonError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Logs the cause; the client only sees a generic message.
pub fn internal_json<E: Display>(e: E) -> JsonError {
    error!(error = %e, "request failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

pub fn internal_text<E: Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error.".to_string(),
    )
}
