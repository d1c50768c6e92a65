//! Review route handlers.
//!
//! Anyone may review a product once and like any review; both are keyed by
//! [`ClientIp`], which is never part of a response body.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use orchard_core::models::{
    NewReview, ProductDetail, ReviewCheck, ReviewLikeResult, ReviewPage, ReviewPageRequest,
    ReviewQuery,
};
use orchard_core::{ProductId, ReviewId};

use crate::db::{ProductRepository, RepositoryError, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::ClientIp;
use crate::state::AppState;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::products::product_detail;

/// Add a review. Returns the product with its recomputed rating.
#[instrument(skip(state, review), fields(client_ip = %ip.as_str()))]
pub async fn create(
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiJson(review): ApiJson<NewReview>,
) -> Result<(StatusCode, Json<ProductDetail>)> {
    review.validate()?;

    ReviewRepository::new(state.pool())
        .create(product_id, ip.as_str(), &review)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::BadRequest("You have already reviewed this product".to_string())
            }
            other => AppError::not_found("Product")(other),
        })?;

    tracing::info!(product_id = %product_id, rating = review.rating, "Review added");

    let detail = product_detail(&state, product_id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// A sorted page of a product's reviews.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiPath(product_id): ApiPath<ProductId>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> Result<Json<ReviewPage>> {
    let request = ReviewPageRequest::try_from(query)?;

    if ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let page = ReviewRepository::new(state.pool())
        .page(product_id, &request)
        .await?;
    Ok(Json(page))
}

/// Whether the caller has already reviewed the product.
#[instrument(skip(state), fields(client_ip = %ip.as_str()))]
pub async fn check(
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Json<ReviewCheck>> {
    let has_reviewed = ReviewRepository::new(state.pool())
        .has_reviewed(product_id, ip.as_str())
        .await?;
    Ok(Json(ReviewCheck { has_reviewed }))
}

/// Toggle the caller's like on a review.
#[instrument(skip(state), fields(client_ip = %ip.as_str()))]
pub async fn toggle_like(
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(review_id): ApiPath<ReviewId>,
) -> Result<Json<ReviewLikeResult>> {
    let result = ReviewRepository::new(state.pool())
        .toggle_like(review_id, ip.as_str())
        .await
        .map_err(AppError::not_found("Review"))?;

    tracing::debug!(review_id = %review_id, has_liked = result.has_liked, "Review like toggled");
    Ok(Json(result))
}
