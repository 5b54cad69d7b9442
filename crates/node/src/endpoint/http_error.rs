use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::prelude::chord_core;

#[derive(Debug)]
pub enum HttpError {
    BadRequest,
    Internal,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (code, msg) = match self {
            HttpError::BadRequest => (StatusCode::BAD_REQUEST, "Bad Request"),
            HttpError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };

        (code, msg).into_response()
    }
}

impl From<chord_core::error::Error> for HttpError {
    fn from(e: chord_core::error::Error) -> Self {
        tracing::debug!("command failed: {}", e);
        HttpError::Internal
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(_: serde_json::Error) -> Self {
        HttpError::BadRequest
    }
}
