//! Principals (admins and users) and the login exchange.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, check_text};
use crate::types::{Email, PrincipalId, Role};

/// Minimum password length for new or changed credentials.
pub const MIN_PASSWORD_LEN: usize = 8;

/// A principal as exposed over the API. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalView {
    pub id: PrincipalId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/admin/login`.
///
/// Both fields default to empty so that a missing field is reported as a
/// validation failure rather than a deserialization error.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Whether both fields were supplied.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful login: a bearer token and the principal it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: PrincipalView,
}

/// Response of `GET /api/admin/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub admin: PrincipalView,
}

const fn default_active() -> bool {
    true
}

const fn default_admin_role() -> Role {
    Role::Admin
}

/// Body of `POST /api/admin/users`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrincipal {
    pub email: Email,
    pub password: String,
    pub name: String,
    #[serde(default = "default_admin_role")]
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl NewPrincipal {
    /// # Errors
    ///
    /// Returns a `ValidationError` for a short password or blank name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_password(&self.password)?;
        check_text("name", &self.name, Some(100))
    }
}

impl fmt::Debug for NewPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewPrincipal")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("permissions", &self.permissions)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Body of `PUT /api/admin/users/{id}`. Absent fields are left unchanged.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl PrincipalPatch {
    /// # Errors
    ///
    /// Returns a `ValidationError` for a short password or blank name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(password) = &self.password {
            check_password(password)?;
        }
        if let Some(name) = &self.name {
            check_text("name", name, Some(100))?;
        }
        Ok(())
    }
}

impl fmt::Debug for PrincipalPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalPatch")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("permissions", &self.permissions)
            .field("is_active", &self.is_active)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}
