//! Request and response bodies shared by the API and its clients.
//!
//! All types serialize with camelCase field names, matching the JSON the
//! storefront front end consumes.

pub mod analytics;
pub mod blog;
pub mod principal;
pub mod product;
pub mod settings;

pub use analytics::*;
pub use blog::*;
pub use principal::*;
pub use product::*;
pub use settings::*;

use serde::{Deserialize, Serialize};

/// A request body failed validation.
///
/// Carries the offending field name and a human-readable message; the API
/// turns this into a 400 response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the invalid field, as it appears on the wire.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error for `field`.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Require a non-blank string of at most `max` characters.
pub(crate) fn check_text(
    field: &'static str,
    value: &str,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    check_max_len(field, value, max)
}

pub(crate) fn check_max_len(
    field: &'static str,
    value: &str,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    match max {
        Some(max) if value.chars().count() > max => Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        )),
        _ => Ok(()),
    }
}

/// Plain acknowledgement body, e.g. `{"message": "Blog deleted"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
