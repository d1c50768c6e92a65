//! Page-view analytics.

use serde::{Deserialize, Serialize};

use super::{ValidationError, check_text};

/// Longest path accepted for a page view.
pub const MAX_PATH_LEN: usize = 2048;

/// Body of `POST /api/analytics/pageview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageViewRequest {
    pub path: String,
}

impl PageViewRequest {
    /// # Errors
    ///
    /// Returns a `ValidationError` for a blank or over-long path, or one that
    /// does not start with `/`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("path", &self.path, Some(MAX_PATH_LEN))?;
        if !self.path.starts_with('/') {
            return Err(ValidationError::new("path", "must start with /"));
        }
        Ok(())
    }
}

/// View count for a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCount {
    pub path: String,
    pub count: i64,
}

/// Response of `GET /api/analytics/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewStats {
    pub total_views: i64,
    /// Views since 00:00 UTC today.
    pub today_views: i64,
    /// The ten most viewed paths, most viewed first.
    pub path_stats: Vec<PathCount>,
}

/// Response of `GET /api/analytics/product-stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total_products: i64,
    pub featured_products: i64,
    pub total_categories: usize,
    pub categories: Vec<String>,
}

/// Response of `GET /api/analytics/blog-stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogStats {
    pub total_blogs: i64,
    /// Page views of paths under `/blog`.
    pub total_views: i64,
    /// Posts created in the last seven days.
    pub recent_posts: i64,
}
