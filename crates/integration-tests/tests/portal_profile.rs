//! Integration tests for the profile page.

use serde_json::json;
use shelfside_integration_tests::{STUDENT_EMAIL, TestContext};

#[tokio::test]
async fn test_profile_shows_account_details() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .get(ctx.url("/profile"))
        .send()
        .await
        .expect("Failed to load profile");
    let body = resp.text().await.expect("Failed to read body");

    assert!(body.contains("Asha Rao"));
    assert!(body.contains(STUDENT_EMAIL));
    assert!(body.contains("student"));
    assert_eq!(ctx.hits.count("profile"), 1);
}

#[tokio::test]
async fn test_update_omits_a_blank_password() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .post(ctx.url("/profile"))
        .form(&[("name", "Asha R"), ("password", "")])
        .send()
        .await
        .expect("Failed to update profile");

    assert_eq!(resp.url().path(), "/profile");
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Profile updated successfully"));

    // A blank password field means keep the current one, so the edit body
    // must not carry a password key at all.
    assert_eq!(
        ctx.bodies.last_profile_edit(),
        Some(json!({"name": "Asha R"}))
    );
}

#[tokio::test]
async fn test_update_sends_a_new_password_when_given() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    ctx.client
        .post(ctx.url("/profile"))
        .form(&[("name", "Asha R"), ("password", "new-secret")])
        .send()
        .await
        .expect("Failed to update profile");

    assert_eq!(
        ctx.bodies.last_profile_edit(),
        Some(json!({"name": "Asha R", "password": "new-secret"}))
    );
}
