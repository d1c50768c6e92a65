//! Database operations for the Orchard `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `principal` - Admin and user accounts (argon2 password hashes)
//! - `product` - Catalog entries with JSONB affiliate links
//! - `product_review` - Reviews, one per (product, client IP)
//! - `review_like` - Review like set, keyed by (review, client IP)
//! - `blog` - Blog posts
//! - `blog_like` - Blog like set, keyed by (blog, client IP)
//! - `page_view` - Raw page-view log
//! - `settings` - Site settings (JSONB)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and embedded in
//! [`MIGRATOR`]. They are not run on server start; run them with:
//! ```bash
//! cargo run -p orchard-cli -- migrate
//! ```

pub mod blogs;
pub mod page_views;
pub mod principals;
pub mod products;
pub mod reviews;
pub mod settings;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use blogs::BlogRepository;
pub use page_views::PageViewRepository;
pub use principals::{PrincipalRecord, PrincipalRepository};
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use settings::SettingsRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, everything else to
    /// `Database`.
    pub(crate) fn from_unique(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(what.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
