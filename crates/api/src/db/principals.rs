//! Principal repository.
//!
//! Principals are admins and users that can sign in. The password hash is
//! only ever loaded by [`PrincipalRepository::get_by_email_with_hash`] for
//! login; every other query returns a [`PrincipalView`].

use core::fmt;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::models::PrincipalView;
use orchard_core::{Email, PrincipalId, Role};

use super::RepositoryError;

const PRINCIPAL_COLUMNS: &str =
    "id, email, name, role, is_active, permissions, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    id: i32,
    email: String,
    name: String,
    role: Role,
    is_active: bool,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for PrincipalView {
    type Error = RepositoryError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: PrincipalId::new(row.id),
            email,
            name: row.name,
            role: row.role,
            is_active: row.is_active,
            permissions: row.permissions,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PrincipalWithHashRow {
    #[sqlx(flatten)]
    principal: PrincipalRow,
    password_hash: String,
}

/// A principal together with its stored password hash.
pub struct PrincipalRecord {
    pub principal: PrincipalView,
    pub password_hash: String,
}

impl fmt::Debug for PrincipalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalRecord")
            .field("principal", &self.principal)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Fields for a new principal. The password must already be hashed.
#[derive(Debug)]
pub struct CreatePrincipal<'a> {
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: Role,
    pub permissions: &'a [String],
    pub is_active: bool,
}

/// Changes to an existing principal. `None` leaves the column unchanged.
#[derive(Debug, Default)]
pub struct UpdatePrincipal<'a> {
    pub name: Option<&'a str>,
    pub role: Option<Role>,
    pub permissions: Option<&'a [String]>,
    pub is_active: Option<bool>,
    pub password_hash: Option<&'a str>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for principal database operations.
pub struct PrincipalRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PrincipalRepository<'a> {
    /// Create a new principal repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all principals, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<PrincipalView>, RepositoryError> {
        let rows = sqlx::query_as::<_, PrincipalRow>(&format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principal ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a principal by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: PrincipalId) -> Result<Option<PrincipalView>, RepositoryError> {
        let row = sqlx::query_as::<_, PrincipalRow>(&format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principal WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a principal and its password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email_with_hash(
        &self,
        email: &Email,
    ) -> Result<Option<PrincipalRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, PrincipalWithHashRow>(&format!(
            "SELECT {PRINCIPAL_COLUMNS}, password_hash FROM principal WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            Ok(PrincipalRecord {
                principal: row.principal.try_into()?,
                password_hash: row.password_hash,
            })
        })
        .transpose()
    }

    /// Create a new principal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: CreatePrincipal<'_>) -> Result<PrincipalView, RepositoryError> {
        let row = sqlx::query_as::<_, PrincipalRow>(&format!(
            r"
            INSERT INTO principal (email, password_hash, name, role, permissions, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRINCIPAL_COLUMNS}
            "
        ))
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.name)
        .bind(new.role)
        .bind(new.permissions)
        .bind(new.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        row.try_into()
    }

    /// Update a principal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the principal does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: PrincipalId,
        changes: UpdatePrincipal<'_>,
    ) -> Result<PrincipalView, RepositoryError> {
        let row = sqlx::query_as::<_, PrincipalRow>(&format!(
            r"
            UPDATE principal
            SET name = COALESCE($2, name),
                role = COALESCE($3, role),
                permissions = COALESCE($4, permissions),
                is_active = COALESCE($5, is_active),
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRINCIPAL_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.role)
        .bind(changes.permissions)
        .bind(changes.is_active)
        .bind(changes.password_hash)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete a principal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the principal does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PrincipalId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM principal WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
