//! Authentication extractors.
//!
//! Handlers declare what they need in their signature:
//!
//! ```rust,ignore
//! async fn delete_blog(
//!     RequireAdmin(admin): RequireAdmin,
//!     Path(id): Path<BlogId>,
//! ) -> Result<Json<MessageResponse>> { ... }
//! ```
//!
//! Every extractor reads `Authorization: Bearer <token>`, verifies it and
//! loads the principal it names. The role extractors check the role carried
//! in the token before touching the database, then check the stored role
//! again once the principal is loaded.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use orchard_core::Role;
use orchard_core::models::PrincipalView;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::AuthError;
use crate::state::AppState;

const ADMIN_REQUIRED: &str = "Access denied. Admin privileges required.";
const SUPER_ADMIN_REQUIRED: &str = "Access denied. Super Admin privileges required.";

/// Extractor that requires any active, authenticated principal.
pub struct RequireAuth(pub PrincipalView);

/// Extractor that requires an `admin` or `super-admin` principal.
pub struct RequireAdmin(pub PrincipalView);

/// Extractor that requires a `super-admin` principal.
pub struct RequireSuperAdmin(pub PrincipalView);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        authorize(parts, state, |_| true, "").await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        authorize(parts, state, Role::is_admin, ADMIN_REQUIRED)
            .await
            .map(Self)
    }
}

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        authorize(parts, state, Role::is_super_admin, SUPER_ADMIN_REQUIRED)
            .await
            .map(Self)
    }
}

async fn authorize(
    parts: &Parts,
    state: &AppState,
    allowed: fn(Role) -> bool,
    denied: &str,
) -> Result<PrincipalView, AppError> {
    let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;

    let auth = state.auth();
    let claims = auth.verify(token)?;
    if !allowed(claims.role) {
        tracing::warn!(principal_id = %claims.sub, role = %claims.role, "Role check failed");
        return Err(AppError::Forbidden(denied.to_string()));
    }

    let principal = auth.load_active(&claims).await?;
    if !allowed(principal.role) {
        tracing::warn!(
            principal_id = %principal.id,
            role = %principal.role,
            "Stored role no longer permits access"
        );
        return Err(AppError::Forbidden(denied.to_string()));
    }

    set_sentry_user(&principal.id, Some(principal.email.as_str()));
    Ok(principal)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
