//! JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hashdrop_core::submission::SubmissionError;
use hashdrop_shared::AppError;
use serde_json::json;

/// An [`AppError`] rendered as `{"error": ..., "message": ...}`.
///
/// Server-side failures are reported with a generic message.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            "An error occurred".to_string()
        };

        (
            self.status(),
            Json(json!({
                "error": self.0.error_code().to_ascii_lowercase(),
                "message": message
            })),
        )
            .into_response()
    }
}
