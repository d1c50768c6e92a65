//! Orchard API library.
//!
//! REST backend for the Orchard storefront and blog: products with reviews,
//! blog posts, admin authentication, analytics and site settings. The binary
//! in `main.rs` only loads configuration, sets up logging and serves
//! [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::services::uploads::{MAX_UPLOAD_BYTES, PUBLIC_PREFIX};
use crate::state::AppState;

/// Multipart overhead allowed on top of the largest upload.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// Build the full application: routes, static uploads and middleware.
///
/// Outside production, error bodies carry their internal `error` detail.
pub fn app(state: AppState) -> Router {
    let uploads = ServeDir::new(state.uploads().dir());

    let mut router = Router::new()
        .merge(routes::routes())
        .nest_service(PUBLIC_PREFIX, uploads);
    if !state.config().environment.is_production() {
        router = router.layer(axum::middleware::map_response(error::expose_error_detail));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + BODY_LIMIT_SLACK))
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use orchard_core::{PrincipalId, Role};

    use super::*;
    use crate::config::{ApiConfig, Environment};
    use crate::services::auth::{Claims, TokenKeys};

    const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

    fn config(jwt_secret: Option<&str>) -> ApiConfig {
        config_for(Environment::Development, jwt_secret)
    }

    fn config_for(environment: Environment, jwt_secret: Option<&str>) -> ApiConfig {
        ApiConfig {
            database_url: SecretString::from("postgres://localhost/orchard_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            environment,
            jwt_secret: jwt_secret.map(SecretString::from),
            upload_dir: PathBuf::from("uploads"),
            trust_proxy: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    // The pool never connects: every request below is answered before the
    // database is touched.
    fn test_app(jwt_secret: Option<&str>) -> Router {
        app_with(config(jwt_secret))
    }

    fn app_with(config: ApiConfig) -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/orchard_test")
            .unwrap();
        app(AppState::new(config, pool))
    }

    fn token(role: Role, expires_in_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: PrincipalId::new(1),
            email: "someone@example.com".to_string(),
            role,
            iat: now,
            exp: now + expires_in_secs,
        };
        TokenKeys::from_secret(&SecretString::from(SECRET))
            .sign(&claims)
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    fn delete_product(bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("DELETE").uri("/api/products/1");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app(None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_admin_route_without_token() {
        let (status, body) = send(test_app(Some(SECRET)), delete_product(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Access denied. No token provided.");
    }

    #[tokio::test]
    async fn test_admin_route_with_expired_token() {
        let expired = token(Role::Admin, -3600);
        let (status, body) = send(test_app(Some(SECRET)), delete_product(Some(&expired))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token.");
    }

    #[tokio::test]
    async fn test_admin_route_with_forged_token() {
        let forged = format!("{}x", token(Role::Admin, 3600));
        let (status, _) = send(test_app(Some(SECRET)), delete_product(Some(&forged))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_route_with_user_role() {
        let user = token(Role::User, 3600);
        let (status, body) = send(test_app(Some(SECRET)), delete_product(Some(&user))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Access denied. Admin privileges required.");
    }

    #[tokio::test]
    async fn test_super_admin_route_with_admin_role() {
        let admin = token(Role::Admin, 3600);
        let request = Request::builder()
            .uri("/api/admin/users")
            .header(header::AUTHORIZATION, format!("Bearer {admin}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(test_app(Some(SECRET)), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["message"],
            "Access denied. Super Admin privileges required."
        );
    }

    fn login(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/admin/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let (status, body) = send(
            test_app(Some(SECRET)),
            login(r#"{"email": "admin@example.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email and password are required");
    }

    #[tokio::test]
    async fn test_login_without_secret() {
        let (status, body) = send(
            test_app(None),
            login(r#"{"email": "admin@example.com", "password": "hunter22hunter22"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server configuration error");
    }

    #[tokio::test]
    async fn test_malformed_path_id() {
        let request = Request::builder()
            .uri("/api/blogs/not-a-number")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(test_app(None), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let (status, body) = send(test_app(Some(SECRET)), login("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    fn bad_blog_path() -> Request<Body> {
        Request::builder()
            .uri("/api/blogs/not-a-number")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_error_detail_follows_each_router_environment() {
        let production = app_with(config_for(Environment::Production, None));
        let development = app_with(config_for(Environment::Development, None));

        let (status, body) = send(production, bad_blog_path()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("error").is_none());

        let (status, body) = send(development, bad_blog_path()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Bad request:"));
    }

    #[tokio::test]
    async fn test_review_page_out_of_range() {
        let request = Request::builder()
            .uri("/api/products/1/reviews?page=9223372036854775807&limit=50")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(test_app(None), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}
