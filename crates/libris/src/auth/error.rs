//! Authentication errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use super::codec::CodecError;

/// Client-facing message for every unauthenticated outcome.
pub const NOT_AUTHORIZED: &str = "Not Authorized";

/// Client-facing message for every entitlement failure.
pub const FORBIDDEN_ACCESS: &str = "Forbidden Access";

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credential cookie on the request.
    #[error("missing credential")]
    MissingCredential,

    /// Signature mismatch or unparseable token.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Credential past its expiry.
    #[error("credential expired")]
    CredentialExpired,

    /// Verified, but not entitled.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Issuance payload is missing required fields.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Signing key, registry or other infrastructure failure.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidCredential(_)
            | AuthError::CredentialExpired => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidCredential(_)
            | AuthError::CredentialExpired => "UNAUTHORIZED",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::BadRequest(_) => "BAD_REQUEST",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to send to the caller. Never includes verification
    /// detail or infrastructure state.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidCredential(_)
            | AuthError::CredentialExpired => NOT_AUTHORIZED.to_string(),
            AuthError::Forbidden(_) => FORBIDDEN_ACCESS.to_string(),
            AuthError::BadRequest(msg) => msg.clone(),
            AuthError::Internal(_) => "Error verifying token".to_string(),
        }
    }
}

impl From<CodecError> for AuthError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Expired => AuthError::CredentialExpired,
            CodecError::InvalidSignature | CodecError::Malformed(_) => {
                AuthError::InvalidCredential(err.to_string())
            }
            CodecError::MissingKey | CodecError::Signing(_) => AuthError::Internal(err.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct AuthErrorResponse {
    pub message: String,
    pub code: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(detail) = &self {
            tracing::error!(error = %detail, "authentication infrastructure failure");
        }

        let body = Json(AuthErrorResponse {
            message: self.public_message(),
            code: self.error_code(),
        });

        (self.status_code(), body).into_response()
    }
}
