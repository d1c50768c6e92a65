//! Admin session route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use orchard_core::models::{LoginRequest, LoginResponse, ProfileResponse};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::extract::ApiJson;

/// Exchange email and password for a bearer token.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let response = state.auth().login(&request).await?;
    Ok(Json(response))
}

/// The principal the bearer token belongs to.
#[instrument(skip(principal), fields(principal_id = %principal.id))]
pub async fn me(RequireAuth(principal): RequireAuth) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        success: true,
        admin: principal,
    })
}
