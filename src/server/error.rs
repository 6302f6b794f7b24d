use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::Error;

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    NotFound(&'static str),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ApiError::Core(err.into())
    }
}

fn status_of(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Authentication | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
        Error::Capacity(_) => StatusCode::PAYLOAD_TOO_LARGE,
        Error::UnsupportedImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        Error::ImageRead(_) => StatusCode::BAD_REQUEST,
        Error::ExportUnavailable | Error::AlreadySubmitted => StatusCode::CONFLICT,
        Error::Render(_) | Error::Storage(_) | Error::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": what }))).into_response()
            }
            ApiError::Core(err) => {
                let status = status_of(&err);
                if status.is_server_error() {
                    error!(error = %err, "request failed");
                }

                let body = match err {
                    Error::Validation(fields) => json!({
                        "error": "Please correct the highlighted fields.",
                        "fields": fields,
                    }),
                    other => json!({ "error": other.to_string() }),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
