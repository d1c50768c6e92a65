//! Client error type.

use thiserror::Error;

/// Errors returned by [`crate::ApiClient`] and [`crate::Storefront`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The base URL or a derived endpoint URL is invalid.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A request body could not be encoded.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The operation needs an admin session.
    #[error("Admin login required")]
    AdminRequired,
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message to show a user: the server's message for API errors.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
