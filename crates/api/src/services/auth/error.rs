//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password missing from the login request.
    #[error("email and password are required")]
    MissingCredentials,

    /// Invalid credentials (unknown email, wrong password, or inactive principal).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No signing secret configured.
    #[error("token signing secret is not configured")]
    NotConfigured,

    /// No bearer token on the request.
    #[error("no token provided")]
    MissingToken,

    /// Token failed signature or claim validation.
    #[error("invalid token: {0}")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    /// Token is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token refers to a principal that no longer exists or is inactive.
    #[error("principal is missing or inactive")]
    InactivePrincipal,

    /// Token could not be created.
    #[error("token encoding failed: {0}")]
    TokenEncoding(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::InvalidToken(err),
        }
    }
}
