//! Typed HTTP client for the Orchard REST API.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use orchard_core::models::{
    Blog, BlogLikeResult, BlogPatch, BlogStats, LoginRequest, LoginResponse, MessageResponse,
    NewBlog, NewPrincipal, NewProduct, NewReview, PageViewRequest, PageViewStats, PrincipalPatch,
    PrincipalView, Product, ProductDetail, ProductPatch, ProductStats, ProfileResponse,
    ReviewCheck, ReviewLikeResult, ReviewPage, ReviewQuery, SiteSettings, SiteSettingsPatch,
};
use orchard_core::{BlogId, PrincipalId, ProductId, ReviewId};

use crate::error::ClientError;

/// An image file to attach to a product create or update.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the Orchard API.
///
/// Admin-only calls take the bearer token explicitly; the client itself
/// holds no session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API at `base_url`, e.g. `http://localhost:5000`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Url` if `base_url` is not a valid URL.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Endpoint paths are joined relative to the base.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    /// The API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ClientError> {
        let builder = self.http.request(method, self.url(path)?);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_owned()
            });

        tracing::debug!(status = status.as_u16(), %message, "API request failed");
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path, token)?).await
    }

    // =========================================================================
    // Admin session
    // =========================================================================

    /// Exchange email and password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 for wrong credentials.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.send(self.request(Method::POST, "api/admin/login", None)?.json(request))
            .await
    }

    /// The principal `token` belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 for a bad token.
    pub async fn me(&self, token: &str) -> Result<ProfileResponse, ClientError> {
        self.get("api/admin/me", Some(token)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        self.get("api/products", None).await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn featured_products(&self) -> Result<Vec<Product>, ClientError> {
        self.get("api/products/featured", None).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the product is missing.
    pub async fn product(&self, id: ProductId) -> Result<ProductDetail, ClientError> {
        self.get(&format!("api/products/{id}"), None).await
    }

    /// Create a product, optionally with an image.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn create_product(
        &self,
        token: &str,
        product: &NewProduct,
        image: Option<ImageUpload>,
    ) -> Result<Product, ClientError> {
        let form = Form::new()
            .text("name", product.name.clone())
            .text("description", product.description.clone())
            .text("price", product.price.to_string())
            .text("category", product.category.clone())
            .text("isFeatured", product.is_featured.to_string())
            .text(
                "affiliateLinks",
                serde_json::to_string(&product.affiliate_links)?,
            );
        let form = attach_image(form, image)?;

        self.send(
            self.request(Method::POST, "api/products", Some(token))?
                .multipart(form),
        )
        .await
    }

    /// Update the supplied fields of a product, optionally replacing its image.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn update_product(
        &self,
        token: &str,
        id: ProductId,
        patch: &ProductPatch,
        image: Option<ImageUpload>,
    ) -> Result<Product, ClientError> {
        let mut form = Form::new();
        if let Some(name) = &patch.name {
            form = form.text("name", name.clone());
        }
        if let Some(description) = &patch.description {
            form = form.text("description", description.clone());
        }
        if let Some(price) = patch.price {
            form = form.text("price", price.to_string());
        }
        if let Some(category) = &patch.category {
            form = form.text("category", category.clone());
        }
        if let Some(is_featured) = patch.is_featured {
            form = form.text("isFeatured", is_featured.to_string());
        }
        if let Some(links) = &patch.affiliate_links {
            form = form.text("affiliateLinks", serde_json::to_string(links)?);
        }
        let form = attach_image(form, image)?;

        self.send(
            self.request(Method::PATCH, &format!("api/products/{id}"), Some(token))?
                .multipart(form),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn toggle_featured(&self, token: &str, id: ProductId) -> Result<Product, ClientError> {
        self.send(self.request(
            Method::PATCH,
            &format!("api/products/{id}/featured"),
            Some(token),
        )?)
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the product is missing.
    pub async fn delete_product(
        &self,
        token: &str,
        id: ProductId,
    ) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("api/products/{id}"), Some(token))?)
            .await
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// Add a review. Returns the product with its recomputed rating.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 if this client already
    /// reviewed the product.
    pub async fn create_review(
        &self,
        product_id: ProductId,
        review: &NewReview,
    ) -> Result<ProductDetail, ClientError> {
        self.send(
            self.request(
                Method::POST,
                &format!("api/products/{product_id}/reviews"),
                None,
            )?
            .json(review),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn reviews(
        &self,
        product_id: ProductId,
        query: &ReviewQuery,
    ) -> Result<ReviewPage, ClientError> {
        let mut url = self.url(&format!("api/products/{product_id}/reviews"))?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(sort) = query.sort {
                pairs.append_pair("sort", sort.as_str());
            }
            if let Some(page) = query.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        self.send(self.http.get(url)).await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn has_reviewed(&self, product_id: ProductId) -> Result<ReviewCheck, ClientError> {
        self.get(&format!("api/products/{product_id}/reviews/check"), None)
            .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the review is missing.
    pub async fn like_review(&self, id: ReviewId) -> Result<ReviewLikeResult, ClientError> {
        self.send(self.request(Method::POST, &format!("api/reviews/{id}/like"), None)?)
            .await
    }

    // =========================================================================
    // Blogs
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn blogs(&self) -> Result<Vec<Blog>, ClientError> {
        self.get("api/blogs", None).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the post is missing.
    pub async fn blog(&self, id: BlogId) -> Result<Blog, ClientError> {
        self.get(&format!("api/blogs/{id}"), None).await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn create_blog(&self, token: &str, blog: &NewBlog) -> Result<Blog, ClientError> {
        self.send(self.request(Method::POST, "api/blogs", Some(token))?.json(blog))
            .await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn update_blog(
        &self,
        token: &str,
        id: BlogId,
        patch: &BlogPatch,
    ) -> Result<Blog, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("api/blogs/{id}"), Some(token))?
                .json(patch),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the post is missing.
    pub async fn delete_blog(&self, token: &str, id: BlogId) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("api/blogs/{id}"), Some(token))?)
            .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 404 if the post is missing.
    pub async fn like_blog(&self, id: BlogId) -> Result<BlogLikeResult, ClientError> {
        self.send(self.request(Method::POST, &format!("api/blogs/{id}/like"), None)?)
            .await
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn record_page_view(&self, path: &str) -> Result<MessageResponse, ClientError> {
        let body = PageViewRequest {
            path: path.to_owned(),
        };
        self.send(
            self.request(Method::POST, "api/analytics/pageview", None)?
                .json(&body),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn page_view_stats(&self, token: &str) -> Result<PageViewStats, ClientError> {
        self.get("api/analytics/stats", Some(token)).await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn product_stats(&self, token: &str) -> Result<ProductStats, ClientError> {
        self.get("api/analytics/product-stats", Some(token)).await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn blog_stats(&self, token: &str) -> Result<BlogStats, ClientError> {
        self.get("api/analytics/blog-stats", Some(token)).await
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn settings(&self, token: &str) -> Result<SiteSettings, ClientError> {
        self.get("api/settings", Some(token)).await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn update_settings(
        &self,
        token: &str,
        patch: &SiteSettingsPatch,
    ) -> Result<SiteSettings, ClientError> {
        self.send(self.request(Method::PUT, "api/settings", Some(token))?.json(patch))
            .await
    }

    // =========================================================================
    // Principals (super admin)
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn principals(&self, token: &str) -> Result<Vec<PrincipalView>, ClientError> {
        self.get("api/admin/users", Some(token)).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 409 for a duplicate email.
    pub async fn create_principal(
        &self,
        token: &str,
        principal: &NewPrincipal,
    ) -> Result<PrincipalView, ClientError> {
        self.send(
            self.request(Method::POST, "api/admin/users", Some(token))?
                .json(principal),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError` on transport or API failure.
    pub async fn update_principal(
        &self,
        token: &str,
        id: PrincipalId,
        patch: &PrincipalPatch,
    ) -> Result<PrincipalView, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("api/admin/users/{id}"), Some(token))?
                .json(patch),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 when deleting oneself.
    pub async fn delete_principal(
        &self,
        token: &str,
        id: PrincipalId,
    ) -> Result<MessageResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("api/admin/users/{id}"), Some(token))?)
            .await
    }
}

fn attach_image(form: Form, image: Option<ImageUpload>) -> Result<Form, ClientError> {
    let Some(image) = image else {
        return Ok(form);
    };
    let part = Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.content_type)?;
    Ok(form.part("image", part))
}
