//! Blog posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, check_max_len, check_text};
use crate::state::Identified;
use crate::types::{BlogId, BlogStatus};

/// Number of content characters used for a derived excerpt.
pub const EXCERPT_CHARS: usize = 150;

const TITLE_MAX: usize = 200;
const SUBTITLE_MAX: usize = 300;
const EXCERPT_MAX: usize = 500;

/// A blog post.
///
/// `likes` is the size of the set of client identities that liked the post;
/// the identities themselves stay on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: BlogId,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub excerpt: String,
    pub image: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub status: BlogStatus,
    pub author: String,
    /// Estimated reading time in minutes.
    pub read_time: i32,
    pub featured: bool,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identified for Blog {
    type Id = BlogId;

    fn id(&self) -> BlogId {
        self.id
    }
}

/// Derive an excerpt from post content.
///
/// Takes the first 150 characters and appends `...` when the content was cut.
#[must_use]
pub fn derive_excerpt(content: &str) -> String {
    let mut chars = content.char_indices();
    match chars.nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_owned(),
    }
}

fn default_category() -> String {
    "General".to_owned()
}

fn default_author() -> String {
    "Admin".to_owned()
}

const fn default_read_time() -> i32 {
    5
}

/// Body of `POST /api/blogs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBlog {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: BlogStatus,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default = "default_read_time")]
    pub read_time: i32,
    #[serde(default)]
    pub featured: bool,
}

impl NewBlog {
    /// A draft with the given title and content and every other field
    /// defaulted.
    pub fn draft(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            content: content.into(),
            excerpt: None,
            image: None,
            category: default_category(),
            tags: Vec::new(),
            status: BlogStatus::Draft,
            author: default_author(),
            read_time: default_read_time(),
            featured: false,
        }
    }

    /// # Errors
    ///
    /// Returns a `ValidationError` for blank or over-long fields, or a
    /// non-positive read time.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("title", &self.title, Some(TITLE_MAX))?;
        if let Some(subtitle) = &self.subtitle {
            check_max_len("subtitle", subtitle, Some(SUBTITLE_MAX))?;
        }
        check_text("content", &self.content, None)?;
        if let Some(excerpt) = &self.excerpt {
            check_max_len("excerpt", excerpt, Some(EXCERPT_MAX))?;
        }
        check_text("category", &self.category, Some(100))?;
        check_text("author", &self.author, Some(100))?;
        check_read_time(self.read_time)
    }

    /// The supplied excerpt, or one derived from the content.
    #[must_use]
    pub fn resolved_excerpt(&self) -> String {
        self.excerpt
            .clone()
            .unwrap_or_else(|| derive_excerpt(&self.content))
    }
}

fn check_read_time(minutes: i32) -> Result<(), ValidationError> {
    if minutes < 1 {
        return Err(ValidationError::new("readTime", "must be at least 1"));
    }
    Ok(())
}

/// Body of `PUT /api/blogs/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BlogStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl BlogPatch {
    /// # Errors
    ///
    /// Returns a `ValidationError` for any supplied field that would fail
    /// [`NewBlog::validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            check_text("title", title, Some(TITLE_MAX))?;
        }
        if let Some(subtitle) = &self.subtitle {
            check_max_len("subtitle", subtitle, Some(SUBTITLE_MAX))?;
        }
        if let Some(content) = &self.content {
            check_text("content", content, None)?;
        }
        if let Some(excerpt) = &self.excerpt {
            check_max_len("excerpt", excerpt, Some(EXCERPT_MAX))?;
        }
        if let Some(category) = &self.category {
            check_text("category", category, Some(100))?;
        }
        if let Some(author) = &self.author {
            check_text("author", author, Some(100))?;
        }
        self.read_time.map_or(Ok(()), check_read_time)
    }

    /// The excerpt to store: the supplied one, else one re-derived from new
    /// content, else `None` (keep the current excerpt).
    #[must_use]
    pub fn resolved_excerpt(&self) -> Option<String> {
        self.excerpt
            .clone()
            .or_else(|| self.content.as_deref().map(derive_excerpt))
    }
}

/// Response of `POST /api/blogs/{id}/like`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogLikeResult {
    #[serde(flatten)]
    pub blog: Blog,
    pub has_liked: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_excerpt_truncates_long_content() {
        let content = "a".repeat(200);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.len(), 153);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_derive_excerpt_keeps_short_content() {
        assert_eq!(derive_excerpt("Short post"), "Short post");
        let exact = "b".repeat(EXCERPT_CHARS);
        assert_eq!(derive_excerpt(&exact), exact);
    }

    #[test]
    fn test_derive_excerpt_counts_chars_not_bytes() {
        let content = "é".repeat(160);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_CHARS + 3);
    }

    #[test]
    fn test_new_blog_defaults() {
        let blog: NewBlog =
            serde_json::from_str(r#"{"title":"Hello","content":"World"}"#).unwrap();
        assert_eq!(blog.author, "Admin");
        assert_eq!(blog.read_time, 5);
        assert_eq!(blog.status, BlogStatus::Draft);
        assert_eq!(blog.category, "General");
        assert_eq!(blog.resolved_excerpt(), "World");
        assert!(blog.validate().is_ok());
    }

    #[test]
    fn test_new_blog_validation() {
        let mut blog = NewBlog::draft("x".repeat(201), "Body");
        assert_eq!(blog.validate().unwrap_err().field, "title");

        blog.title = "Fine".to_owned();
        blog.excerpt = Some("e".repeat(501));
        assert_eq!(blog.validate().unwrap_err().field, "excerpt");

        blog.excerpt = None;
        blog.read_time = 0;
        assert_eq!(blog.validate().unwrap_err().field, "readTime");
    }

    #[test]
    fn test_patch_rederives_excerpt_from_new_content() {
        let patch = BlogPatch {
            content: Some("Fresh content".to_owned()),
            ..BlogPatch::default()
        };
        assert_eq!(patch.resolved_excerpt().as_deref(), Some("Fresh content"));

        let patch = BlogPatch {
            content: Some("Fresh content".to_owned()),
            excerpt: Some("Hand written".to_owned()),
            ..BlogPatch::default()
        };
        assert_eq!(patch.resolved_excerpt().as_deref(), Some("Hand written"));

        assert!(BlogPatch::default().resolved_excerpt().is_none());
    }
}
