//! Unified API error handling with structured responses.

use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::{AuthError, FORBIDDEN_ACCESS, NOT_AUTHORIZED};

/// API error type with structured responses.
///
/// Every variant carries the message shown to the caller. Internal detail
/// is logged where the failure happens and never stored here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Data store failure on a catalog route.
    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized(NOT_AUTHORIZED.to_string())
    }

    pub fn forbidden() -> Self {
        Self::Forbidden(FORBIDDEN_ACCESS.to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Log `err` and hide it behind `public` with a storage status.
    pub fn storage(public: &str, err: anyhow::Error) -> Self {
        error!(error = ?err, "{}", public);
        Self::Storage(format!("{public}. Server Error Occurred!"))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Storage(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        tracing::debug!(error_code = code, status = %status, "API error");

        let body = ErrorResponse {
            message: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

/// Convert auth errors to API errors.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential
            | AuthError::InvalidCredential(_)
            | AuthError::CredentialExpired => ApiError::unauthorized(),
            AuthError::Forbidden(_) => ApiError::forbidden(),
            AuthError::BadRequest(msg) => ApiError::BadRequest(msg),
            AuthError::Internal(detail) => {
                error!(error = %detail, "authentication infrastructure failure");
                ApiError::internal("Internal Server Error")
            }
        }
    }
}

/// Unclassified failures are logged and reported as a bare 500.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = ?err, "unhandled error");
        ApiError::internal("Internal Server Error")
    }
}

/// Malformed or mistyped JSON bodies are a plain 400 with the usual body.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections render as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
