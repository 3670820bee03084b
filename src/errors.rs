//! API error types
//!
//! Every failure a handler can produce ends up here. Client errors carry their
//! detail to the caller; server errors are logged and rendered generically.

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::core::TokenError;

/// Why a request could not be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Authorization header absent or not using the `Bearer` scheme
    MissingScheme,
    /// `Bearer` scheme without a token
    MissingToken,
    /// Signature valid but past its expiration
    Expired,
    /// Signature or structure invalid
    Malformed,
    /// Token is valid but no longer the user's live session
    SessionRevoked,
}

impl AuthFailure {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingScheme => "Token type is not valid",
            Self::MissingToken => "No token provided",
            Self::Expired => "Token expired",
            Self::Malformed => "Invalid token",
            Self::SessionRevoked => "Not authorized",
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(AuthFailure),

    #[error("Email or password is wrong")]
    InvalidCredentials,

    #[error("Email is not verified")]
    EmailNotVerified,

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Verification has already been passed")]
    AlreadyVerified,

    #[error("No file provided")]
    NoFileProvided,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Request timed out")]
    Timeout,

    #[error("Service overloaded")]
    Overloaded,

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Mailer error: {0}")]
    Mailer(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::AlreadyVerified | Self::NoFileProvided => {
                StatusCode::BAD_REQUEST
            }

            Self::Unauthenticated(_) | Self::InvalidCredentials | Self::EmailNotVerified => {
                StatusCode::UNAUTHORIZED
            }

            Self::NotFound => StatusCode::NOT_FOUND,

            Self::Conflict(_) => StatusCode::CONFLICT,

            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            Self::Timeout => StatusCode::REQUEST_TIMEOUT,

            Self::Overloaded => StatusCode::SERVICE_UNAVAILABLE,

            Self::ImageProcessing(_)
            | Self::Storage(_)
            | Self::Mailer(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for clients
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Unauthenticated(AuthFailure::Expired) => "token_expired",
            Self::Unauthenticated(AuthFailure::Malformed) => "invalid_token",
            Self::Unauthenticated(_) => "unauthorized",
            Self::InvalidCredentials => "invalid_credentials",
            Self::EmailNotVerified => "email_not_verified",
            Self::NotFound => "not_found",
            Self::Conflict(_) => "conflict",
            Self::AlreadyVerified => "already_verified",
            Self::NoFileProvided => "no_file_provided",
            Self::PayloadTooLarge => "payload_too_large",
            Self::Timeout => "request_timeout",
            Self::Overloaded => "service_unavailable",
            Self::ImageProcessing(_) => "image_processing_error",
            Self::Storage(_) | Self::Mailer(_) | Self::Internal(_) => "server_error",
        }
    }

    /// Message safe to show to the caller. Never includes upstream detail.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(detail) => detail.clone(),
            Self::Unauthenticated(failure) => failure.message().to_string(),
            Self::Conflict(detail) => detail.clone(),
            Self::ImageProcessing(_) => "Failed to process image".to_string(),
            Self::Storage(_) | Self::Mailer(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(code = self.error_code(), "request rejected");
        }

        let body = Json(json!({
            "code": self.error_code(),
            "message": self.user_message(),
        }));

        (status, body).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Unauthenticated(AuthFailure::Expired),
            TokenError::Malformed => Self::Unauthenticated(AuthFailure::Malformed),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
