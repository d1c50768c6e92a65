//! Site settings route handlers (admin).

use axum::{Json, extract::State};
use tracing::instrument;

use orchard_core::models::{SiteSettings, SiteSettingsPatch};

use crate::db::SettingsRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

use super::extract::ApiJson;

/// Current site settings, created with defaults on first read.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<SiteSettings>> {
    let settings = SettingsRepository::new(state.pool()).site().await?;
    Ok(Json(settings))
}

/// Apply a partial update. Unknown fields are rejected with 400.
#[instrument(skip(admin, state, patch), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<SiteSettingsPatch>,
) -> Result<Json<SiteSettings>> {
    let repo = SettingsRepository::new(state.pool());

    let mut settings = repo.site().await?;
    settings.apply(patch)?;
    repo.save_site(&settings).await?;

    tracing::info!("Site settings updated");
    Ok(Json(settings))
}
