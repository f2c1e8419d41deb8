//! API error types with HTTP response mapping.

use application::AppError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Application-level error.
    App(AppError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, "Request.Invalid", &msg),
            ApiError::App(err) => app_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal", &msg)
            }
        }
    }
}

fn app_error_to_response(err: AppError) -> Response {
    let status = match &err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::EmailAlreadyExists | AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::NotFound => StatusCode::NOT_FOUND,
        AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AppError::NotAuthorized => StatusCode::FORBIDDEN,
        AppError::Cancelled => StatusCode::REQUEST_TIMEOUT,
        AppError::Store(_) | AppError::Outbox(_) | AppError::Serialization(_) => {
            tracing::error!(error = %err, "infrastructure failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    // Validation failures carry the whole per-field error set.
    if let AppError::Validation(errors) = &err {
        let body = serde_json::json!({
            "error": "validation failed",
            "code": err.code(),
            "errors": errors.clone().into_vec(),
        });
        return (status, axum::Json(body)).into_response();
    }

    error_body(status, err.code(), &err.to_string())
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    let body = serde_json::json!({ "error": message, "code": code });
    (status, axum::Json(body)).into_response()
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}
