//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use orchard_api::db::{self, RepositoryError};
use orchard_api::services::auth::AuthError;
use orchard_core::EmailError;
use orchard_core::models::ValidationError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing failed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super-admin, admin, manager, user")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A field failed validation.
    #[error("Invalid {0}")]
    Validation(#[from] ValidationError),

    /// Fixture file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Fixture file is not valid YAML for the expected shape.
    #[error("Invalid fixture file: {0}")]
    Fixture(#[from] serde_yaml::Error),
}

/// Database URL from `ORCHARD_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("ORCHARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("ORCHARD_DATABASE_URL"))
}

async fn connect() -> Result<PgPool, CliError> {
    let url = database_url()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&url).await?)
}

/// Password for new principals, from `ORCHARD_ADMIN_PASSWORD`.
fn admin_password() -> Result<String, CliError> {
    std::env::var("ORCHARD_ADMIN_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())
        .ok_or(CliError::MissingEnvVar("ORCHARD_ADMIN_PASSWORD"))
}
