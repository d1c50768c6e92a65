//! End-to-end tests for blogs, analytics and settings.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The API server running (`cargo run -p orchard-api`)
//! - `ORCHARD_ADMIN_PASSWORD` set to the seeded super admin's password

use orchard_client::{ApiClient, Storefront};
use orchard_core::models::{BlogPatch, NewBlog, SiteSettingsPatch, ThemePatch};
use orchard_core::{BlogId, BlogStatus};
use orchard_integration_tests::{TestContext, base_url, unique};

fn context() -> TestContext {
    TestContext::new().expect("Invalid ORCHARD_TEST_URL")
}

// ============================================================================
// Blogs
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_blog_lifecycle() {
    let ctx = context();
    let token = ctx.admin_token().await.expect("Admin login failed");

    let mut draft = NewBlog::draft(unique("Post"), "a".repeat(400));
    draft.status = BlogStatus::Published;
    let created = ctx
        .api
        .create_blog(&token, &draft)
        .await
        .expect("Failed to create blog");
    assert_eq!(created.excerpt.chars().count(), 153);
    assert!(created.excerpt.ends_with("..."));

    let updated = ctx
        .api
        .update_blog(&token, created.id, &BlogPatch {
            content: Some("Short now.".to_string()),
            ..BlogPatch::default()
        })
        .await
        .expect("Failed to update blog");
    assert_eq!(updated.excerpt, "Short now.");
    assert_eq!(updated.title, created.title);

    ctx.api
        .delete_blog(&token, created.id)
        .await
        .expect("Failed to delete blog");
    let err = ctx
        .api
        .blog(created.id)
        .await
        .expect_err("Deleted blog must be gone");
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_blog_like_twice_restores_count() {
    let ctx = context();
    let token = ctx.admin_token().await.expect("Admin login failed");
    let blog = ctx
        .api
        .create_blog(&token, &NewBlog::draft(unique("Liked"), "Body"))
        .await
        .expect("Failed to create blog");

    let liked = ctx.api.like_blog(blog.id).await.expect("Like failed");
    assert!(liked.has_liked);
    assert_eq!(liked.blog.likes, blog.likes + 1);

    let unliked = ctx.api.like_blog(blog.id).await.expect("Unlike failed");
    assert!(!unliked.has_liked);
    assert_eq!(unliked.blog.likes, blog.likes);

    ctx.api
        .delete_blog(&token, blog.id)
        .await
        .expect("Failed to clean up blog");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_delete_missing_blog_leaves_collection_unchanged() {
    let ctx = context();
    let token = ctx.admin_token().await.expect("Admin login failed");
    let before = ctx.api.blogs().await.expect("Failed to list");

    let err = ctx
        .api
        .delete_blog(&token, BlogId::new(i32::MAX))
        .await
        .expect_err("Missing blog must fail");

    assert_eq!(err.status(), Some(404));
    assert_eq!(ctx.api.blogs().await.expect("Failed to list"), before);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_storefront_admin_session() {
    let ctx = context();
    let mut shop = Storefront::new(ApiClient::new(&base_url()).expect("Invalid base URL"));

    shop.login(
        ctx.admin_email(),
        &std::env::var("ORCHARD_ADMIN_PASSWORD").unwrap_or_default(),
    )
    .await
    .expect("Storefront login failed");
    assert!(shop.auth().is_admin());

    shop.refresh_blogs().await.expect("Failed to refresh blogs");
    let created = shop
        .create_blog(&NewBlog::draft(unique("Storefront"), "Body"))
        .await
        .expect("Failed to create blog");
    assert_eq!(shop.blogs().items().first().map(|b| b.id), Some(created.id));

    shop.delete_blog(created.id).await.expect("Failed to delete blog");
    assert!(shop.blogs().items().iter().all(|b| b.id != created.id));

    shop.logout();
    assert!(!shop.auth().is_authenticated());
}

// ============================================================================
// Analytics
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_page_views_are_counted() {
    let ctx = context();
    let token = ctx.admin_token().await.expect("Admin login failed");
    let before = ctx
        .api
        .page_view_stats(&token)
        .await
        .expect("Failed to read stats");
    let blog_before = ctx
        .api
        .blog_stats(&token)
        .await
        .expect("Failed to read blog stats");

    ctx.api
        .record_page_view("/blog/integration")
        .await
        .expect("Failed to record view");

    let after = ctx
        .api
        .page_view_stats(&token)
        .await
        .expect("Failed to read stats");
    assert_eq!(after.total_views, before.total_views + 1);
    assert_eq!(after.today_views, before.today_views + 1);
    assert!(after.path_stats.len() <= 10);

    let blog_after = ctx
        .api
        .blog_stats(&token)
        .await
        .expect("Failed to read blog stats");
    assert_eq!(blog_after.total_views, blog_before.total_views + 1);

    let products = ctx
        .api
        .product_stats(&token)
        .await
        .expect("Failed to read product stats");
    assert_eq!(products.total_categories, products.categories.len());
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_page_view_requires_path() {
    let ctx = context();
    let err = ctx
        .api
        .record_page_view("")
        .await
        .expect_err("Blank path must fail");
    assert_eq!(err.status(), Some(400));
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_settings_partial_update() {
    let ctx = context();
    let token = ctx.admin_token().await.expect("Admin login failed");
    let original = ctx.api.settings(&token).await.expect("Failed to read settings");

    let updated = ctx
        .api
        .update_settings(&token, &SiteSettingsPatch {
            theme: Some(ThemePatch {
                primary_color: Some("#123456".to_string()),
                secondary_color: None,
            }),
            ..SiteSettingsPatch::default()
        })
        .await
        .expect("Failed to update settings");
    assert_eq!(updated.theme.primary_color, "#123456");
    assert_eq!(updated.theme.secondary_color, original.theme.secondary_color);
    assert_eq!(updated.site_name, original.site_name);

    let err = ctx
        .api
        .update_settings(&token, &SiteSettingsPatch {
            theme: Some(ThemePatch {
                primary_color: Some("orange".to_string()),
                secondary_color: None,
            }),
            ..SiteSettingsPatch::default()
        })
        .await
        .expect_err("Bad colour must fail");
    assert_eq!(err.status(), Some(400));

    ctx.api
        .update_settings(&token, &SiteSettingsPatch {
            theme: Some(ThemePatch {
                primary_color: Some(original.theme.primary_color.clone()),
                secondary_color: None,
            }),
            ..SiteSettingsPatch::default()
        })
        .await
        .expect("Failed to restore settings");
}
