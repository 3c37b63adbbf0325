use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use urlencoding;

use crate::errors::AppError;

// The IntoResponse trait implementation converts AppError into a well-formed
// HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Authentication errors redirect to login
            AppError::Auth(msg) => {
                Redirect::to(&format!("/?error={}", urlencoding::encode(&msg)))
                    .into_response()
            }

            // Persistence errors are internal server errors
            AppError::Store(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {}", e)
            ).into_response(),

            // File and upload errors are bad requests
            AppError::File(e) => (
                StatusCode::BAD_REQUEST,
                format!("File error: {}", e)
            ).into_response(),

            AppError::Upload(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Upload error: {}", msg)
            ).into_response(),

            // Requests naming a record that does not exist
            AppError::User(msg) => (
                StatusCode::NOT_FOUND,
                format!("User error: {}", msg)
            ).into_response(),
        }
    }
}
