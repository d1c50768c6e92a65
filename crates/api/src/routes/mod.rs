//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness check
//! GET    /health/ready                    - Database readiness check
//!
//! # Products
//! GET    /api/products                    - All products, newest first
//! GET    /api/products/featured           - Featured products
//! GET    /api/products/{id}               - Product with reviews
//! POST   /api/products                    - Create (admin, multipart)
//! PATCH  /api/products/{id}               - Partial update (admin, multipart)
//! PATCH  /api/products/{id}/featured      - Toggle featured flag (admin)
//! DELETE /api/products/{id}               - Delete (admin)
//!
//! # Reviews
//! POST   /api/products/{id}/reviews       - Add a review (once per client)
//! GET    /api/products/{id}/reviews       - Sorted, paginated reviews
//! GET    /api/products/{id}/reviews/check - Has this client reviewed?
//! POST   /api/reviews/{id}/like           - Toggle like
//!
//! # Blogs
//! GET    /api/blogs                       - All posts, newest first
//! GET    /api/blogs/{id}                  - One post
//! POST   /api/blogs                       - Create (admin)
//! PUT    /api/blogs/{id}                  - Partial update (admin)
//! DELETE /api/blogs/{id}                  - Delete (admin)
//! POST   /api/blogs/{id}/like             - Toggle like
//!
//! # Admin
//! POST   /api/admin/login                 - Password login, returns token
//! GET    /api/admin/me                    - Current principal
//! GET    /api/admin/users                 - List principals (super admin)
//! POST   /api/admin/users                 - Create principal (super admin)
//! PUT    /api/admin/users/{id}            - Update principal (super admin)
//! DELETE /api/admin/users/{id}            - Delete principal (super admin)
//!
//! # Analytics
//! POST   /api/analytics/pageview          - Record a page view
//! GET    /api/analytics/stats             - Page view stats (admin)
//! GET    /api/analytics/product-stats     - Catalog stats (admin)
//! GET    /api/analytics/blog-stats        - Blog stats (admin)
//!
//! # Settings
//! GET    /api/settings                    - Site settings (admin)
//! PUT    /api/settings                    - Update site settings (admin)
//! ```

pub mod admin;
pub mod admin_users;
pub mod analytics;
pub mod blogs;
pub mod extract;
pub mod products;
pub mod reviews;
pub mod settings;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Build the API router (without middleware layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Products
        .route("/products", get(products::index).post(products::create))
        .route("/products/featured", get(products::featured))
        .route(
            "/products/{id}",
            get(products::show)
                .patch(products::update)
                .delete(products::delete),
        )
        .route("/products/{id}/featured", patch(products::toggle_featured))
        // Reviews
        .route(
            "/products/{id}/reviews",
            get(reviews::index).post(reviews::create),
        )
        .route("/products/{id}/reviews/check", get(reviews::check))
        .route("/reviews/{id}/like", post(reviews::toggle_like))
        // Blogs
        .route("/blogs", get(blogs::index).post(blogs::create))
        .route(
            "/blogs/{id}",
            get(blogs::show).put(blogs::update).delete(blogs::delete),
        )
        .route("/blogs/{id}/like", post(blogs::toggle_like))
        // Admin
        .route("/admin/login", post(admin::login))
        .route("/admin/me", get(admin::me))
        .route(
            "/admin/users",
            get(admin_users::index).post(admin_users::create),
        )
        .route(
            "/admin/users/{id}",
            put(admin_users::update).delete(admin_users::delete),
        )
        // Analytics
        .route("/analytics/pageview", post(analytics::record_page_view))
        .route("/analytics/stats", get(analytics::page_view_stats))
        .route("/analytics/product-stats", get(analytics::product_stats))
        .route("/analytics/blog-stats", get(analytics::blog_stats))
        // Settings
        .route("/settings", get(settings::show).put(settings::update))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
