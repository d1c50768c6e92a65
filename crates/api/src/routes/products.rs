//! Product route handlers.
//!
//! Create and update take `multipart/form-data` so the product image can be
//! uploaded with the other fields. Text fields arrive as strings and are
//! parsed here into typed values before validation.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
};
use tracing::instrument;

use orchard_core::models::{
    AffiliateLink, MessageResponse, NewProduct, Product, ProductDetail, ProductPatch,
    ValidationError, parse_affiliate_links,
};
use orchard_core::{Price, ProductId};

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

use super::extract::ApiPath;

/// A file part of a multipart body.
struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Raw product form fields, as submitted.
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<String>,
    category: Option<String>,
    is_featured: Option<String>,
    affiliate_links: Option<String>,
    image: Option<UploadedFile>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await?;
                    // An empty file input still sends a part.
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        form.image = Some(UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                "name" => form.name = Some(field.text().await?),
                "description" => form.description = Some(field.text().await?),
                "price" => form.price = Some(field.text().await?),
                "category" => form.category = Some(field.text().await?),
                "isFeatured" => form.is_featured = Some(field.text().await?),
                "affiliateLinks" => form.affiliate_links = Some(field.text().await?),
                other => tracing::debug!(field = %other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn into_new(self) -> std::result::Result<(NewProduct, Option<UploadedFile>), ValidationError> {
        let required = |field: &'static str, value: Option<String>| {
            value.ok_or_else(|| ValidationError::new(field, "is required"))
        };

        let price = required("price", self.price)?;
        let product = NewProduct {
            name: required("name", self.name)?,
            description: required("description", self.description)?,
            price: parse_price(&price)?,
            category: required("category", self.category)?,
            is_featured: self
                .is_featured
                .as_deref()
                .map(parse_flag)
                .transpose()?
                .unwrap_or(false),
            affiliate_links: self
                .affiliate_links
                .as_deref()
                .map(parse_links)
                .transpose()?
                .unwrap_or_default(),
        };
        product.validate()?;

        Ok((product, self.image))
    }

    fn into_patch(self) -> std::result::Result<(ProductPatch, Option<UploadedFile>), ValidationError> {
        let patch = ProductPatch {
            name: self.name,
            description: self.description,
            price: self.price.as_deref().map(parse_price).transpose()?,
            category: self.category,
            is_featured: self.is_featured.as_deref().map(parse_flag).transpose()?,
            affiliate_links: self.affiliate_links.as_deref().map(parse_links).transpose()?,
        };
        patch.validate()?;

        Ok((patch, self.image))
    }
}

fn parse_price(raw: &str) -> std::result::Result<Price, ValidationError> {
    Price::parse(raw).map_err(|e| ValidationError::new("price", e.to_string()))
}

fn parse_flag(raw: &str) -> std::result::Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" | "" => Ok(false),
        _ => Err(ValidationError::new("isFeatured", "must be true or false")),
    }
}

fn parse_links(raw: &str) -> std::result::Result<Vec<AffiliateLink>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    parse_affiliate_links(raw)
}

async fn store_image(state: &AppState, image: Option<&UploadedFile>) -> Result<Option<String>> {
    let Some(file) = image else {
        return Ok(None);
    };
    let path = state
        .uploads()
        .save_image(&file.file_name, file.content_type.as_deref(), &file.bytes)
        .await?;
    Ok(Some(path))
}

/// All products, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

/// Featured products, newest first.
#[instrument(skip(state))]
pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_featured().await?;
    Ok(Json(products))
}

/// One product with all its reviews.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<ProductDetail>> {
    product_detail(&state, id).await.map(Json)
}

pub(super) async fn product_detail(state: &AppState, id: ProductId) -> Result<ProductDetail> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(id)
        .await?;

    Ok(ProductDetail { product, reviews })
}

/// Create a product (admin).
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let (new, image) = ProductForm::read(multipart?).await?.into_new()?;
    let image_path = store_image(&state, image.as_ref()).await?;

    match ProductRepository::new(state.pool())
        .create(&new, image_path.as_deref())
        .await
    {
        Ok(product) => {
            tracing::info!(product_id = %product.id, "Product created");
            Ok((StatusCode::CREATED, Json(product)))
        }
        Err(e) => {
            if let Some(path) = &image_path {
                state.uploads().remove(path).await;
            }
            Err(e.into())
        }
    }
}

/// Partially update a product (admin). A new image replaces the old file.
#[instrument(skip(admin, state, multipart), fields(admin_id = %admin.id))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Product>> {
    let (patch, image) = ProductForm::read(multipart?).await?.into_patch()?;
    let image_path = store_image(&state, image.as_ref()).await?;

    let result = ProductRepository::new(state.pool())
        .update(id, &patch, image_path.as_deref())
        .await;

    match result {
        Ok((product, replaced)) => {
            if let Some(old) = replaced {
                state.uploads().remove(&old).await;
            }
            tracing::info!(product_id = %product.id, "Product updated");
            Ok(Json(product))
        }
        Err(e) => {
            if let Some(path) = &image_path {
                state.uploads().remove(path).await;
            }
            Err(AppError::not_found("Product")(e))
        }
    }
}

/// Flip a product's featured flag (admin).
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn toggle_featured(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .toggle_featured(id)
        .await
        .map_err(AppError::not_found("Product"))?;

    tracing::info!(product_id = %id, is_featured = product.is_featured, "Featured flag toggled");
    Ok(Json(product))
}

/// Delete a product, its reviews and its image file (admin).
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<MessageResponse>> {
    let image = ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(AppError::not_found("Product"))?;

    if let Some(path) = image {
        state.uploads().remove(&path).await;
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
