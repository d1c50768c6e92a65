//! End-to-end tests for admin login and route protection.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`orchard migrate`, `orchard seed`)
//! - The API server running (`cargo run -p orchard-api`)
//! - `ORCHARD_ADMIN_PASSWORD` set to the seeded super admin's password

use orchard_client::ClientError;
use orchard_core::models::{BlogPatch, LoginRequest, NewPrincipal, PrincipalPatch};
use orchard_core::{BlogId, Email, ProductId, Role};
use orchard_integration_tests::{TestContext, base_url, unique};

fn context() -> TestContext {
    TestContext::new().expect("Invalid ORCHARD_TEST_URL")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health_endpoints() {
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to reach /health");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("Failed to reach /health/ready");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_login_returns_token_for_stored_principal() {
    let ctx = context();
    let response = ctx
        .api
        .login(&LoginRequest::new(
            ctx.admin_email(),
            std::env::var("ORCHARD_ADMIN_PASSWORD").unwrap_or_default(),
        ))
        .await
        .expect("Login failed");

    assert!(response.success);
    assert_eq!(response.user.email.as_str(), ctx.admin_email());

    let profile = ctx.api.me(&response.token).await.expect("Profile failed");
    assert_eq!(profile.admin.id, response.user.id);
    assert_eq!(profile.admin.email, response.user.email);
    assert_eq!(profile.admin.role, response.user.role);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let ctx = context();

    let wrong_password = ctx
        .api
        .login(&LoginRequest::new(ctx.admin_email(), "definitely-not-it"))
        .await
        .expect_err("Wrong password must fail");
    let unknown_email = ctx
        .api
        .login(&LoginRequest::new("nobody@example.com", "definitely-not-it"))
        .await
        .expect_err("Unknown email must fail");

    assert_eq!(wrong_password.status(), Some(401));
    assert_eq!(unknown_email.status(), Some(401));
    assert_eq!(wrong_password.user_message(), unknown_email.user_message());
}

// ============================================================================
// Route protection
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_admin_routes_reject_missing_and_bad_tokens() {
    let ctx = context();
    let before = ctx.api.blogs().await.expect("Failed to list blogs");
    let Some(target) = before.first() else {
        return;
    };

    let missing = reqwest::Client::new()
        .delete(format!("{}/api/blogs/{}", base_url(), target.id))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(missing.status(), reqwest::StatusCode::UNAUTHORIZED);

    let bad = ctx
        .api
        .update_blog("not-a-jwt", target.id, &BlogPatch {
            title: Some("Hijacked".into()),
            ..BlogPatch::default()
        })
        .await
        .expect_err("Bad token must fail");
    assert_eq!(bad.status(), Some(401));

    let after = ctx.api.blog(target.id).await.expect("Failed to fetch blog");
    assert_eq!(after.title, target.title);
    assert_eq!(ctx.api.blogs().await.expect("Failed to list blogs").len(), before.len());
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_role_and_active_flag_are_rechecked() {
    let ctx = context();
    let token = ctx.admin_token().await.expect("Admin login failed");

    let email = format!("{}@example.com", unique("staff").replace(' ', "-"));
    let password = "staff-password-123";
    let principal = ctx
        .api
        .create_principal(&token, &NewPrincipal {
            email: Email::parse(&email).expect("Invalid test email"),
            password: password.to_string(),
            name: "Staff".to_string(),
            role: Role::Admin,
            permissions: Vec::new(),
            is_active: true,
        })
        .await
        .expect("Failed to create principal");

    let staff_token = ctx
        .api
        .login(&LoginRequest::new(&email, password))
        .await
        .expect("Staff login failed")
        .token;
    ctx.api
        .settings(&staff_token)
        .await
        .expect("Admin token must reach settings");

    // Demoted: the stored role wins over the role in the token.
    ctx.api
        .update_principal(&token, principal.id, &PrincipalPatch {
            role: Some(Role::User),
            ..PrincipalPatch::default()
        })
        .await
        .expect("Failed to demote principal");
    let err = ctx
        .api
        .delete_product(&staff_token, ProductId::new(i32::MAX))
        .await
        .expect_err("Demoted principal must be rejected");
    assert_eq!(err.status(), Some(403));

    // Deactivated principals lose access even with a valid token.
    ctx.api
        .update_principal(&token, principal.id, &PrincipalPatch {
            role: Some(Role::Admin),
            is_active: Some(false),
            ..PrincipalPatch::default()
        })
        .await
        .expect("Failed to deactivate principal");
    let err = ctx
        .api
        .delete_blog(&staff_token, BlogId::new(i32::MAX))
        .await
        .expect_err("Inactive principal must be rejected");
    assert_eq!(err.status(), Some(401));

    ctx.api
        .delete_principal(&token, principal.id)
        .await
        .expect("Failed to clean up principal");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_super_admin_cannot_delete_self() {
    let ctx = context();
    let token = ctx.admin_token().await.expect("Admin login failed");
    let me = ctx.api.me(&token).await.expect("Profile failed").admin;

    let err = ctx
        .api
        .delete_principal(&token, me.id)
        .await
        .expect_err("Self deletion must fail");
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.user_message(), "You cannot delete your own account");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded admin"]
async fn test_duplicate_principal_email_conflicts() {
    let ctx = context();
    let token = ctx.admin_token().await.expect("Admin login failed");

    let err = ctx
        .api
        .create_principal(&token, &NewPrincipal {
            email: Email::parse(ctx.admin_email()).expect("Invalid admin email"),
            password: "another-password".to_string(),
            name: "Duplicate".to_string(),
            role: Role::Admin,
            permissions: Vec::new(),
            is_active: true,
        })
        .await
        .expect_err("Duplicate email must fail");
    assert!(matches!(err, ClientError::Api { status: 409, .. }));
}
