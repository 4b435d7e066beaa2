//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use guestbook_core::GuestbookError;
use guestbook_core::client::ErrorBody;
use guestbook_core::controller::SUBMIT_FAILED_MESSAGE;
use tracing::error;

/// An error rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<GuestbookError> for ApiError {
    fn from(e: GuestbookError) -> Self {
        match e {
            GuestbookError::Validation(message) => Self::bad_request(message),
            other => {
                error!(error = %other, "guestbook write failed");
                Self::internal(SUBMIT_FAILED_MESSAGE)
            }
        }
    }
}
