//! Image upload storage.
//!
//! Uploaded product images are written to the configured upload directory as
//! `<unix-millis>-<random>.<ext>` and referenced by their public path
//! `/uploads/<name>`, which the router serves statically.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

/// URL prefix uploaded files are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];
const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Extension or MIME type is not an accepted image type.
    #[error("Only image files are allowed (jpeg, jpg, png, gif)")]
    UnsupportedType,

    /// File exceeds [`MAX_UPLOAD_BYTES`].
    #[error("File too large (max {max} bytes)")]
    TooLarge { max: usize },

    /// Empty file.
    #[error("Uploaded file is empty")]
    Empty,

    /// Filesystem error.
    #[error("upload storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check an upload's name, declared MIME type and size.
///
/// Returns the lowercased extension to store the file under.
///
/// # Errors
///
/// Returns `UploadError::UnsupportedType` for a non-image extension or MIME
/// type, `UploadError::TooLarge` or `UploadError::Empty` for a bad size.
pub fn validate_image(
    file_name: &str,
    content_type: Option<&str>,
    len: usize,
) -> Result<String, UploadError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or(UploadError::UnsupportedType)?;

    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .ok_or(UploadError::UnsupportedType)?;
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(UploadError::UnsupportedType);
    }

    if len == 0 {
        return Err(UploadError::Empty);
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            max: MAX_UPLOAD_BYTES,
        });
    }

    Ok(extension)
}

/// Writes and removes uploaded files under one directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory files are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and store an image, returning its public path.
    ///
    /// # Errors
    ///
    /// Returns a validation `UploadError` (see [`validate_image`]) or
    /// `UploadError::Io` if the file cannot be written.
    pub async fn save_image(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let extension = validate_image(file_name, content_type, bytes.len())?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
        let stored_name = format!("{}-{suffix}.{extension}", Utc::now().timestamp_millis());
        tokio::fs::write(self.dir.join(&stored_name), bytes).await?;

        tracing::info!(file = %stored_name, bytes = bytes.len(), "Stored upload");
        Ok(format!("{PUBLIC_PREFIX}/{stored_name}"))
    }

    /// Remove a previously stored file by its public path.
    ///
    /// Best effort: failures are logged, not returned. Paths outside the
    /// upload prefix are ignored.
    pub async fn remove(&self, public_path: &str) {
        let Some(name) = stored_name(public_path) else {
            tracing::warn!(path = %public_path, "Refusing to remove file outside upload directory");
            return;
        };

        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => tracing::info!(file = %name, "Removed upload"),
            Err(e) => tracing::warn!(file = %name, error = %e, "Failed to remove upload"),
        }
    }
}

/// The bare file name behind `/uploads/<name>`, if it is one.
fn stored_name(public_path: &str) -> Option<&str> {
    let name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
    let is_plain = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..");
    is_plain.then_some(name)
}
