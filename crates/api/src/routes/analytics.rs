//! Analytics route handlers.
//!
//! Page views are recorded anonymously by the storefront; the stats
//! endpoints feed the admin dashboard.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::instrument;

use orchard_core::models::{BlogStats, MessageResponse, PageViewRequest, PageViewStats, ProductStats};

use crate::db::{BlogRepository, PageViewRepository, ProductRepository};
use crate::error::Result;
use crate::middleware::{ClientIp, RequireAdmin};
use crate::state::AppState;

use super::extract::ApiJson;

/// Path prefixes counted as blog traffic; the storefront links to both.
const BLOG_PATH_PREFIXES: [&str; 2] = ["/blog", "/blogs"];

/// How far back a post counts as recent.
const RECENT_POST_DAYS: i64 = 7;

/// Whether `path` counts toward blog traffic, as `count_under` matches it.
fn is_blog_path(path: &str) -> bool {
    BLOG_PATH_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Start of the current UTC day.
fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Record one page view.
///
/// Paths are stored as sent. Views of `/blog`, `/blogs` and anything below
/// them feed the blog traffic total.
#[instrument(skip(state, headers, request), fields(path = %request.path))]
pub async fn record_page_view(
    State(state): State<AppState>,
    ip: ClientIp,
    headers: HeaderMap,
    ApiJson(request): ApiJson<PageViewRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    request.validate()?;

    let path = request.path.trim();
    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    PageViewRepository::new(state.pool())
        .record(path, user_agent, Some(ip.as_str()))
        .await?;
    tracing::debug!(blog = is_blog_path(path), "Page view recorded");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Page view recorded")),
    ))
}

/// Total and today's page views, plus the top paths.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn page_view_stats(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<PageViewStats>> {
    let stats = PageViewRepository::new(state.pool())
        .stats(start_of_day(Utc::now()))
        .await?;
    Ok(Json(stats))
}

/// Catalog totals.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn product_stats(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ProductStats>> {
    let stats = ProductRepository::new(state.pool()).stats().await?;
    Ok(Json(stats))
}

/// Post totals and blog traffic.
#[instrument(skip(admin, state), fields(admin_id = %admin.id))]
pub async fn blog_stats(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<BlogStats>> {
    let since = Utc::now() - Duration::days(RECENT_POST_DAYS);
    let (total_blogs, recent_posts) = BlogRepository::new(state.pool()).counts(since).await?;
    let total_views = PageViewRepository::new(state.pool())
        .count_under(&BLOG_PATH_PREFIXES)
        .await?;

    Ok(Json(BlogStats {
        total_blogs,
        total_views,
        recent_posts,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_start_of_day_is_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 17, 45, 12).unwrap();
        let start = start_of_day(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_blog_paths_include_post_pages() {
        assert!(is_blog_path("/blog"));
        assert!(is_blog_path("/blog/archive"));
        assert!(is_blog_path("/blogs"));
        assert!(is_blog_path("/blogs/42"));
        assert!(!is_blog_path("/blogger"));
        assert!(!is_blog_path("/products/blog"));
        assert!(!is_blog_path("/"));
    }
}
