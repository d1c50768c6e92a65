//! Principal management commands.
//!
//! # Usage
//!
//! ```bash
//! ORCHARD_ADMIN_PASSWORD='...' orchard admin create -e admin@example.com -n "Admin Name" -r super-admin
//! orchard admin list
//! ```

use sqlx::PgPool;

use orchard_api::db::PrincipalRepository;
use orchard_api::db::principals::CreatePrincipal;
use orchard_api::services::auth::hash_password;
use orchard_core::models::{NewPrincipal, PrincipalView};
use orchard_core::{Email, Role};

use super::{CliError, admin_password, connect};

/// Build and validate a new principal from command-line input.
pub(super) fn new_principal(
    email: &str,
    name: &str,
    role: &str,
    password: String,
) -> Result<NewPrincipal, CliError> {
    let role: Role = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;

    let principal = NewPrincipal {
        email: Email::parse(email)?,
        password,
        name: name.trim().to_owned(),
        role,
        permissions: Vec::new(),
        is_active: true,
    };
    principal.validate()?;
    Ok(principal)
}

/// Insert a validated principal, hashing its password.
pub(super) async fn insert(pool: &PgPool, new: &NewPrincipal) -> Result<PrincipalView, CliError> {
    let password_hash = hash_password(&new.password)?;

    let principal = PrincipalRepository::new(pool)
        .create(CreatePrincipal {
            email: &new.email,
            password_hash: &password_hash,
            name: &new.name,
            role: new.role,
            permissions: &new.permissions,
            is_active: new.is_active,
        })
        .await?;

    Ok(principal)
}

/// Create a new principal. The password comes from `ORCHARD_ADMIN_PASSWORD`.
///
/// # Errors
///
/// Returns `CliError` for invalid input, a duplicate email, or database
/// failures.
pub async fn create(email: &str, name: &str, role: &str) -> Result<PrincipalView, CliError> {
    let new = new_principal(email, name, role, admin_password()?)?;
    let pool = connect().await?;

    tracing::info!("Creating principal: {} ({})", new.email, new.role);
    let principal = insert(&pool, &new).await?;

    tracing::info!(
        "Principal created successfully! ID: {}, Email: {}, Role: {}",
        principal.id,
        principal.email,
        principal.role
    );
    Ok(principal)
}

/// Log every principal.
///
/// # Errors
///
/// Returns `CliError` if the database query fails.
pub async fn list() -> Result<(), CliError> {
    let pool = connect().await?;
    let principals = PrincipalRepository::new(&pool).list_all().await?;

    tracing::info!("{} principal(s)", principals.len());
    for p in &principals {
        tracing::info!(
            "  #{} {} <{}> role={} active={}",
            p.id,
            p.name,
            p.email,
            p.role,
            p.is_active
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_principal_valid() {
        let p = new_principal(" Ops@Example.com ", "Ops", "super-admin", "long-enough-pw".into())
            .unwrap();
        assert_eq!(p.email.as_str(), "ops@example.com");
        assert_eq!(p.role, Role::SuperAdmin);
        assert!(p.is_active);
    }

    #[test]
    fn test_new_principal_rejects_bad_input() {
        assert!(matches!(
            new_principal("a@b.co", "A", "owner", "long-enough-pw".into()),
            Err(CliError::InvalidRole(_))
        ));
        assert!(matches!(
            new_principal("not-an-email", "A", "admin", "long-enough-pw".into()),
            Err(CliError::InvalidEmail(_))
        ));
        assert!(matches!(
            new_principal("a@b.co", "A", "admin", "short".into()),
            Err(CliError::Validation(_))
        ));
    }
}
