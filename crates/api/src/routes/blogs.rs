//! Blog route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use orchard_core::BlogId;
use orchard_core::models::{Blog, BlogLikeResult, BlogPatch, MessageResponse, NewBlog};

use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::middleware::{ClientIp, RequireAdmin};
use crate::state::AppState;

use super::extract::{ApiJson, ApiPath};

/// All posts, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Blog>>> {
    let blogs = BlogRepository::new(state.pool()).list_all().await?;
    Ok(Json(blogs))
}

/// One post.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BlogId>,
) -> Result<Json<Blog>> {
    BlogRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))
}

/// Create a post (admin).
#[instrument(skip(admin, state, new), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(new): ApiJson<NewBlog>,
) -> Result<(StatusCode, Json<Blog>)> {
    new.validate()?;

    let blog = BlogRepository::new(state.pool()).create(&new).await?;
    tracing::info!(blog_id = %blog.id, status = %blog.status, "Blog created");

    Ok((StatusCode::CREATED, Json(blog)))
}

/// Apply a partial update to a post (admin).
#[instrument(skip(admin, state, patch), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BlogId>,
    ApiJson(patch): ApiJson<BlogPatch>,
) -> Result<Json<Blog>> {
    patch.validate()?;

    let blog = BlogRepository::new(state.pool())
        .update(id, &patch)
        .await
        .map_err(AppError::not_found("Blog"))?;
    tracing::info!(blog_id = %id, "Blog updated");

    Ok(Json(blog))
}

/// Delete a post (admin).
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BlogId>,
) -> Result<Json<MessageResponse>> {
    BlogRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::not_found("Blog"))?;
    tracing::info!(blog_id = %id, "Blog deleted");

    Ok(Json(MessageResponse::new("Blog deleted successfully")))
}

/// Toggle the caller's like on a post.
#[instrument(skip(state), fields(client_ip = %ip.as_str()))]
pub async fn toggle_like(
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(id): ApiPath<BlogId>,
) -> Result<Json<BlogLikeResult>> {
    let result = BlogRepository::new(state.pool())
        .toggle_like(id, ip.as_str())
        .await
        .map_err(AppError::not_found("Blog"))?;

    tracing::debug!(blog_id = %id, likes = result.blog.likes, has_liked = result.has_liked, "Blog like toggled");
    Ok(Json(result))
}
