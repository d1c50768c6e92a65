//! Authentication service.
//!
//! Password login against argon2 hashes and verification of the signed
//! session tokens issued on success.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenKeys};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use orchard_core::models::{LoginRequest, LoginResponse, PrincipalView};
use orchard_core::Email;

use crate::db::PrincipalRepository;

/// Authentication service.
///
/// `tokens` is `None` when no signing secret is configured; login then
/// fails with [`AuthError::NotConfigured`] and no token can be verified.
pub struct AuthService<'a> {
    principals: PrincipalRepository<'a>,
    tokens: Option<&'a TokenKeys>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: Option<&'a TokenKeys>) -> Self {
        Self {
            principals: PrincipalRepository::new(pool),
            tokens,
        }
    }

    /// Login with email and password.
    ///
    /// Unknown email, wrong password and inactive principal all produce the
    /// same `InvalidCredentials` error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if either field is empty.
    /// Returns `AuthError::NotConfigured` if no signing secret is set.
    /// Returns `AuthError::InvalidCredentials` if the credentials are wrong.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        if !request.is_complete() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(tokens) = self.tokens else {
            tracing::error!("JWT_SECRET is not configured; refusing login");
            return Err(AuthError::NotConfigured);
        };

        let Ok(email) = Email::parse(&request.email) else {
            return Err(reject_unknown(&request.password));
        };

        let Some(record) = self.principals.get_by_email_with_hash(&email).await? else {
            return Err(reject_unknown(&request.password));
        };

        verify_password(&request.password, &record.password_hash)?;

        if !record.principal.is_active {
            tracing::warn!(principal_id = %record.principal.id, "Login attempt for inactive principal");
            return Err(AuthError::InvalidCredentials);
        }

        let token = tokens.sign(&Claims::for_principal(&record.principal))?;
        tracing::info!(principal_id = %record.principal.id, "Principal logged in");

        Ok(LoginResponse {
            success: true,
            token,
            user: record.principal,
        })
    }

    /// Verify a token without touching the database.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` without a signing secret, otherwise
    /// the token validation error.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.ok_or(AuthError::NotConfigured)?.verify(token)
    }

    /// Load the principal named by verified claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InactivePrincipal` if the principal is gone or
    /// disabled.
    pub async fn load_active(&self, claims: &Claims) -> Result<PrincipalView, AuthError> {
        let principal = self
            .principals
            .get_by_id(claims.sub)
            .await?
            .filter(|p| p.is_active)
            .ok_or(AuthError::InactivePrincipal)?;

        Ok(principal)
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Hash of a fixed throwaway password, verified against when no principal
/// matches so unknown emails cost the same argon2 work as wrong passwords.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("orchard-unknown-principal").ok());

/// Burn one verification against [`DUMMY_HASH`] and reject.
fn reject_unknown(password: &str) -> AuthError {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
