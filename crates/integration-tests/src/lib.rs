//! End-to-end tests for the Orchard API.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare and seed the database, then start the server
//! cargo run -p orchard-cli -- migrate
//! ORCHARD_ADMIN_PASSWORD=... cargo run -p orchard-cli -- seed
//! cargo run -p orchard-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p orchard-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `ORCHARD_TEST_URL` - API base URL (default: `http://127.0.0.1:5000`)
//! - `ORCHARD_ADMIN_EMAIL` - seeded super admin (default: `admin@example.com`)
//! - `ORCHARD_ADMIN_PASSWORD` - its password

use orchard_client::{ApiClient, ClientError};
use orchard_core::models::LoginRequest;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

/// API base URL under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("ORCHARD_TEST_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// Shared handles for one test.
pub struct TestContext {
    pub api: ApiClient,
    admin_email: String,
    admin_password: String,
}

impl TestContext {
    /// Build a context from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `ORCHARD_TEST_URL` is not a valid URL.
    pub fn new() -> Result<Self, ClientError> {
        Ok(Self {
            api: ApiClient::new(&base_url())?,
            admin_email: std::env::var("ORCHARD_ADMIN_EMAIL")
                .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string()),
            admin_password: std::env::var("ORCHARD_ADMIN_PASSWORD").unwrap_or_default(),
        })
    }

    #[must_use]
    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    /// Log in as the seeded super admin and return the bearer token.
    ///
    /// # Errors
    ///
    /// Returns the login failure.
    pub async fn admin_token(&self) -> Result<String, ClientError> {
        let response = self
            .api
            .login(&LoginRequest::new(&self.admin_email, &self.admin_password))
            .await?;
        Ok(response.token)
    }
}

/// A name no other test run will produce.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix} {}", uuid::Uuid::new_v4().simple())
}
