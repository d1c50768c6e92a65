//! Principal management route handlers (super admin only).

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use orchard_core::PrincipalId;
use orchard_core::models::{MessageResponse, NewPrincipal, PrincipalPatch, PrincipalView};

use crate::db::principals::{CreatePrincipal, UpdatePrincipal};
use crate::db::PrincipalRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireSuperAdmin;
use crate::services::auth::hash_password;
use crate::state::AppState;

use super::extract::{ApiJson, ApiPath};

/// List all principals.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn index(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<PrincipalView>>> {
    let principals = PrincipalRepository::new(state.pool()).list_all().await?;
    Ok(Json(principals))
}

/// Create a principal. Duplicate email is a 409.
#[instrument(skip(admin, state, new), fields(admin_id = %admin.id))]
pub async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewPrincipal>,
) -> Result<(StatusCode, Json<PrincipalView>)> {
    new.validate()?;

    let password_hash = hash_password(&new.password)?;
    let principal = PrincipalRepository::new(state.pool())
        .create(CreatePrincipal {
            email: &new.email,
            password_hash: &password_hash,
            name: new.name.trim(),
            role: new.role,
            permissions: &new.permissions,
            is_active: new.is_active,
        })
        .await?;

    tracing::info!(principal_id = %principal.id, role = %principal.role, "Principal created");
    Ok((StatusCode::CREATED, Json(principal)))
}

/// Update a principal's profile, role, status or password.
#[instrument(skip(admin, state, patch), fields(admin_id = %admin.id))]
pub async fn update(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PrincipalId>,
    ApiJson(patch): ApiJson<PrincipalPatch>,
) -> Result<Json<PrincipalView>> {
    patch.validate()?;

    let password_hash = patch.password.as_deref().map(hash_password).transpose()?;
    let principal = PrincipalRepository::new(state.pool())
        .update(
            id,
            UpdatePrincipal {
                name: patch.name.as_deref().map(str::trim),
                role: patch.role,
                permissions: patch.permissions.as_deref(),
                is_active: patch.is_active,
                password_hash: password_hash.as_deref(),
            },
        )
        .await
        .map_err(AppError::not_found("User"))?;

    tracing::info!(principal_id = %id, "Principal updated");
    Ok(Json(principal))
}

/// Delete a principal. A principal cannot delete itself.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<PrincipalId>,
) -> Result<Json<MessageResponse>> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    PrincipalRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::not_found("User"))?;

    tracing::info!(principal_id = %id, "Principal deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
