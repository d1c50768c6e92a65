//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//!
//! ```json
//! {"success": false, "message": "Product not found", "error": "Not found: product 7"}
//! ```
//!
//! where `error` carries the internal detail. Error responses are rendered
//! without it; routers built for a non-production environment add it back
//! with [`expose_error_detail`]. Server errors are logged and captured to
//! Sentry before responding.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{StatusCode, header::CONTENT_LENGTH},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use orchard_core::models::ValidationError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::uploads::UploadError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Upload rejected or could not be stored.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Request body failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Principal lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflicts with existing data.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Internal detail of an error response, kept in the response extensions.
#[derive(Debug, Clone)]
struct ErrorDetail {
    message: String,
    detail: String,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl AppError {
    /// Turn `RepositoryError::NotFound` into a 404 naming `what`.
    pub fn not_found(what: &str) -> impl FnOnce(RepositoryError) -> Self + '_ {
        move |err| match err {
            RepositoryError::NotFound => Self::NotFound(format!("{what} not found")),
            other => Self::Database(other),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::MissingCredentials => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken(_)
                | AuthError::TokenExpired
                | AuthError::InactivePrincipal => StatusCode::UNAUTHORIZED,
                AuthError::NotConfigured
                | AuthError::TokenEncoding(_)
                | AuthError::PasswordHash
                | AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Upload(UploadError::Io(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upload(_) | Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    // Don't expose internal error details in `message`.
    fn public_message(&self) -> String {
        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(what) => capitalize(what),
                _ => "Internal server error".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::MissingCredentials => "Email and password are required".to_string(),
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::NotConfigured => "Server configuration error".to_string(),
                AuthError::MissingToken => "Access denied. No token provided.".to_string(),
                AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                    "Invalid token.".to_string()
                }
                AuthError::InactivePrincipal => "Invalid token or user is inactive.".to_string(),
                AuthError::TokenEncoding(_)
                | AuthError::PasswordHash
                | AuthError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Upload(UploadError::Io(_)) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Upload(err) => err.to_string(),
            Self::Validation(err) => err.to_string(),
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let message = self.public_message();
        let body = ErrorBody {
            success: false,
            message: message.clone(),
            error: None,
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorDetail {
            message,
            detail: self.to_string(),
        });
        response
    }
}

/// Response mapper that re-renders error bodies with their `error` detail.
///
/// Only layered onto routers for non-production environments.
pub async fn expose_error_detail(mut response: Response) -> Response {
    let Some(ErrorDetail { message, detail }) = response.extensions_mut().remove::<ErrorDetail>()
    else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    let body = ErrorBody {
        success: false,
        message,
        error: Some(detail),
    };
    (parts, Json(body)).into_response()
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an authenticated principal.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
