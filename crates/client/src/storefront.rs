//! Storefront session state backed by the API.

use orchard_core::models::{
    Blog, BlogPatch, LoginRequest, NewBlog, PrincipalView, Product, ProductSnapshot,
};
use orchard_core::state::{AuthState, ListCache, ToggleCollection, Toggled};
use orchard_core::{BlogId, ProductId};

use crate::api::ApiClient;
use crate::error::ClientError;

/// Blog category filter value that matches every post.
pub const ALL_CATEGORIES: &str = "all";

/// Client-side state of one storefront visitor.
///
/// Favorites and cart live only here; they are never sent to the server.
/// The blog and product lists are caches of the last successful fetch.
#[derive(Debug)]
pub struct Storefront {
    api: ApiClient,
    auth: AuthState,
    favorites: ToggleCollection<ProductSnapshot>,
    cart: ToggleCollection<ProductSnapshot>,
    blogs: ListCache<Blog>,
    products: ListCache<Product>,
    blog_category: String,
}

impl Storefront {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            auth: AuthState::new(),
            favorites: ToggleCollection::new(),
            cart: ToggleCollection::new(),
            blogs: ListCache::new(),
            products: ListCache::new(),
            blog_category: ALL_CATEGORIES.to_owned(),
        }
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    #[must_use]
    pub const fn favorites(&self) -> &ToggleCollection<ProductSnapshot> {
        &self.favorites
    }

    #[must_use]
    pub const fn cart(&self) -> &ToggleCollection<ProductSnapshot> {
        &self.cart
    }

    #[must_use]
    pub const fn blogs(&self) -> &ListCache<Blog> {
        &self.blogs
    }

    #[must_use]
    pub const fn products(&self) -> &ListCache<Product> {
        &self.products
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Log in and keep the returned token for admin calls.
    ///
    /// A failure drops any existing session and records the server's message
    /// in [`AuthState::last_error`].
    ///
    /// # Errors
    ///
    /// Returns the underlying `ClientError` on failure.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<PrincipalView, ClientError> {
        match self.api.login(&LoginRequest::new(email, password)).await {
            Ok(response) => {
                tracing::info!(user_id = %response.user.id, "Signed in");
                self.auth.sign_in(response.token, response.user.clone());
                Ok(response.user)
            }
            Err(err) => {
                self.auth.fail(err.user_message());
                Err(err)
            }
        }
    }

    pub fn logout(&mut self) {
        self.auth.sign_out();
    }

    fn admin_token(&self) -> Result<&str, ClientError> {
        if !self.auth.is_admin() {
            return Err(ClientError::AdminRequired);
        }
        self.auth.token().ok_or(ClientError::AdminRequired)
    }

    // =========================================================================
    // Cached lists
    // =========================================================================

    /// Fetch all blog posts into the cache.
    ///
    /// On failure the previously cached posts stay in place.
    ///
    /// # Errors
    ///
    /// Returns the underlying `ClientError` on failure.
    pub async fn refresh_blogs(&mut self) -> Result<(), ClientError> {
        self.blogs.begin();
        match self.api.blogs().await {
            Ok(blogs) => {
                self.blogs.resolve(blogs);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch blogs");
                self.blogs.reject(err.user_message());
                Err(err)
            }
        }
    }

    /// Fetch all products into the cache.
    ///
    /// # Errors
    ///
    /// Returns the underlying `ClientError` on failure.
    pub async fn refresh_products(&mut self) -> Result<(), ClientError> {
        self.products.begin();
        match self.api.products().await {
            Ok(products) => {
                self.products.resolve(products);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch products");
                self.products.reject(err.user_message());
                Err(err)
            }
        }
    }

    /// Select the blog category filter; [`ALL_CATEGORIES`] clears it.
    pub fn set_blog_category(&mut self, category: impl Into<String>) {
        self.blog_category = category.into();
    }

    #[must_use]
    pub fn blog_category(&self) -> &str {
        &self.blog_category
    }

    /// Cached posts in the selected category.
    pub fn visible_blogs(&self) -> impl Iterator<Item = &Blog> {
        let category = self.blog_category.as_str();
        self.blogs
            .items()
            .iter()
            .filter(move |blog| category == ALL_CATEGORIES || blog.category == category)
    }

    // =========================================================================
    // Favorites and cart
    // =========================================================================

    pub fn toggle_favorite(&mut self, product: &Product) -> Toggled {
        self.favorites.toggle(ProductSnapshot::from(product))
    }

    pub fn toggle_cart(&mut self, product: &Product) -> Toggled {
        self.cart.toggle(ProductSnapshot::from(product))
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    // =========================================================================
    // Blog actions
    // =========================================================================

    /// Toggle this client's like on a post and refresh its cached copy.
    ///
    /// Returns whether the post is liked afterwards.
    ///
    /// # Errors
    ///
    /// Returns the underlying `ClientError` on failure.
    pub async fn like_blog(&mut self, id: BlogId) -> Result<bool, ClientError> {
        let result = self.api.like_blog(id).await?;
        self.replace_blog(result.blog);
        Ok(result.has_liked)
    }

    /// # Errors
    ///
    /// Returns `ClientError::AdminRequired` without an admin session.
    pub async fn create_blog(&mut self, blog: &NewBlog) -> Result<Blog, ClientError> {
        let created = self.api.create_blog(self.admin_token()?, blog).await?;
        self.blogs.items_mut().insert(0, created.clone());
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `ClientError::AdminRequired` without an admin session.
    pub async fn update_blog(&mut self, id: BlogId, patch: &BlogPatch) -> Result<Blog, ClientError> {
        let updated = self.api.update_blog(self.admin_token()?, id, patch).await?;
        self.replace_blog(updated.clone());
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns `ClientError::AdminRequired` without an admin session.
    pub async fn delete_blog(&mut self, id: BlogId) -> Result<(), ClientError> {
        self.api.delete_blog(self.admin_token()?, id).await?;
        self.blogs.items_mut().retain(|blog| blog.id != id);
        Ok(())
    }

    fn replace_blog(&mut self, blog: Blog) {
        if let Some(cached) = self.blogs.items_mut().iter_mut().find(|b| b.id == blog.id) {
            *cached = blog;
        }
    }

    // =========================================================================
    // Product actions
    // =========================================================================

    /// # Errors
    ///
    /// Returns `ClientError::AdminRequired` without an admin session.
    pub async fn toggle_featured(&mut self, id: ProductId) -> Result<bool, ClientError> {
        let product = self.api.toggle_featured(self.admin_token()?, id).await?;
        let is_featured = product.is_featured;
        if let Some(cached) = self
            .products
            .items_mut()
            .iter_mut()
            .find(|p| p.id == product.id)
        {
            *cached = product;
        }
        Ok(is_featured)
    }

    /// Delete a product and drop it from the cache, favorites and cart.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AdminRequired` without an admin session.
    pub async fn delete_product(&mut self, id: ProductId) -> Result<(), ClientError> {
        self.api.delete_product(self.admin_token()?, id).await?;
        self.products.items_mut().retain(|product| product.id != id);
        self.favorites.remove(id);
        self.cart.remove(id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use orchard_core::state::LoadStatus;

    use super::*;

    fn blog_json(id: i32, category: &str, likes: i32) -> serde_json::Value {
        json!({
            "id": id,
            "title": format!("Post {id}"),
            "subtitle": null,
            "content": "Body",
            "excerpt": "Body",
            "image": null,
            "category": category,
            "tags": [],
            "status": "published",
            "author": "Admin",
            "readTime": 5,
            "featured": false,
            "likes": likes,
            "createdAt": "2026-10-01T12:00:00Z",
            "updatedAt": "2026-10-01T12:00:00Z"
        })
    }

    fn product_json(id: i32, is_featured: bool) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Product {id}"),
            "description": "Hand made",
            "price": "19.99",
            "category": "Kitchen",
            "image": null,
            "isFeatured": is_featured,
            "affiliateLinks": [],
            "rating": 0.0,
            "numReviews": 0,
            "createdAt": "2026-10-01T12:00:00Z",
            "updatedAt": "2026-10-01T12:00:00Z"
        })
    }

    fn principal_json(role: &str) -> serde_json::Value {
        json!({
            "id": 1,
            "email": "admin@example.com",
            "name": "Admin",
            "role": role,
            "isActive": true,
            "permissions": [],
            "createdAt": "2026-10-01T12:00:00Z",
            "updatedAt": "2026-10-01T12:00:00Z"
        })
    }

    async fn mount_login(server: &MockServer, role: &str) {
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "tok-abc",
                "user": principal_json(role)
            })))
            .mount(server)
            .await;
    }

    async fn storefront(server: &MockServer) -> Storefront {
        Storefront::new(ApiClient::new(&server.uri()).unwrap())
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cached_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/blogs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([blog_json(1, "News", 0)])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/blogs"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"success": false, "message": "Internal server error"})),
            )
            .mount(&server)
            .await;

        let mut shop = storefront(&server).await;
        shop.refresh_blogs().await.unwrap();
        assert_eq!(shop.blogs().status(), LoadStatus::Loaded);

        assert!(shop.refresh_blogs().await.is_err());
        assert_eq!(shop.blogs().status(), LoadStatus::Errored);
        assert_eq!(shop.blogs().error(), Some("Internal server error"));
        assert_eq!(shop.blogs().items().len(), 1);
    }

    #[tokio::test]
    async fn test_blog_category_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/blogs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                blog_json(1, "News", 0),
                blog_json(2, "Guides", 0),
                blog_json(3, "News", 0)
            ])))
            .mount(&server)
            .await;

        let mut shop = storefront(&server).await;
        shop.refresh_blogs().await.unwrap();
        assert_eq!(shop.visible_blogs().count(), 3);

        shop.set_blog_category("News");
        let ids: Vec<i32> = shop.visible_blogs().map(|b| b.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);

        shop.set_blog_category(ALL_CATEGORIES);
        assert_eq!(shop.visible_blogs().count(), 3);
    }

    #[tokio::test]
    async fn test_like_blog_updates_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/blogs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([blog_json(4, "News", 2)])))
            .mount(&server)
            .await;
        let mut liked = blog_json(4, "News", 3);
        liked["hasLiked"] = json!(true);
        Mock::given(method("POST"))
            .and(path("/api/blogs/4/like"))
            .respond_with(ResponseTemplate::new(200).set_body_json(liked))
            .mount(&server)
            .await;

        let mut shop = storefront(&server).await;
        shop.refresh_blogs().await.unwrap();

        assert!(shop.like_blog(BlogId::new(4)).await.unwrap());
        assert_eq!(shop.blogs().items().first().unwrap().likes, 3);
    }

    #[tokio::test]
    async fn test_favorites_and_cart_toggle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([product_json(1, false), product_json(2, true)])),
            )
            .mount(&server)
            .await;

        let mut shop = storefront(&server).await;
        shop.refresh_products().await.unwrap();
        let first = shop.products().items().first().cloned().unwrap();
        let second = shop.products().items().get(1).cloned().unwrap();

        assert_eq!(shop.toggle_favorite(&first), Toggled::Added);
        assert_eq!(shop.toggle_favorite(&first), Toggled::Removed);
        assert!(shop.favorites().is_empty());

        shop.toggle_cart(&first);
        shop.toggle_cart(&second);
        assert_eq!(shop.cart().len(), 2);
        assert_eq!(shop.cart().get(ProductId::new(2)).unwrap().name, "Product 2");

        shop.clear_cart();
        assert!(shop.cart().is_empty());
    }

    #[tokio::test]
    async fn test_admin_actions_require_admin_session() {
        let server = MockServer::start().await;
        let mut shop = storefront(&server).await;

        let err = shop.delete_blog(BlogId::new(1)).await.unwrap_err();
        assert!(matches!(err, ClientError::AdminRequired));

        mount_login(&server, "user").await;
        shop.login("admin@example.com", "password123").await.unwrap();
        assert!(shop.auth().is_authenticated());

        let err = shop.toggle_featured(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, ClientError::AdminRequired));
    }

    #[tokio::test]
    async fn test_failed_login_records_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"success": false, "message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let mut shop = storefront(&server).await;
        assert!(shop.login("admin@example.com", "nope-nope").await.is_err());
        assert!(!shop.auth().is_authenticated());
        assert_eq!(shop.auth().last_error(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_delete_product_drops_it_everywhere() {
        let server = MockServer::start().await;
        mount_login(&server, "admin").await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(9, false)])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/products/9"))
            .and(header("authorization", "Bearer tok-abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Product deleted successfully"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut shop = storefront(&server).await;
        shop.login("admin@example.com", "password123").await.unwrap();
        shop.refresh_products().await.unwrap();
        let product = shop.products().items().first().cloned().unwrap();
        shop.toggle_cart(&product);
        shop.toggle_favorite(&product);

        shop.delete_product(ProductId::new(9)).await.unwrap();

        assert!(shop.products().items().is_empty());
        assert!(shop.cart().is_empty());
        assert!(shop.favorites().is_empty());

        shop.logout();
        assert!(shop.auth().token().is_none());
    }
}
