//! API error type
//!
//! Every failure reaches the client as
//! `{"error": {"code": "...", "message": "..."}}`.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// daisy-common error, mapped by kind
    #[error(transparent)]
    Portal(#[from] daisy_common::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use daisy_common::Error as E;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Portal(err) => {
                let status = match err {
                    E::UnknownStudent(_) => StatusCode::NOT_FOUND,
                    E::InvalidCategory(_) | E::NoFilesProvided | E::EmptyBiography => {
                        StatusCode::BAD_REQUEST
                    }
                    E::RemoteUploadFailed(_) | E::RemoteDeleteFailed(_) => StatusCode::BAD_GATEWAY,
                    E::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    E::Io(_) | E::Roster(_) | E::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.kind())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code, "{}", self);
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
