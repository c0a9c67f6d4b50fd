//! Integration tests for the reservations page.

use shelfside_integration_tests::TestContext;

#[tokio::test]
async fn test_reservations_render_with_formatted_timestamp() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .get(ctx.url("/reservations"))
        .send()
        .await
        .expect("Failed to load reservations");
    let body = resp.text().await.expect("Failed to read body");

    assert!(body.contains("Dune"));
    assert!(body.contains("2026-03-08 14:30"));
    assert!(body.contains("pending"));
    assert!(body.contains(r#"action="/reservations/1/cancel""#));
}

#[tokio::test]
async fn test_cancel_redirects_back_with_message() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .post(ctx.url("/reservations/1/cancel"))
        .send()
        .await
        .expect("Failed to cancel reservation");

    assert_eq!(resp.url().path(), "/reservations");
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Reservation cancelled successfully"));

    assert_eq!(ctx.hits.count("cancel"), 1);
    assert_eq!(ctx.hits.count("reservations"), 1);
}

#[tokio::test]
async fn test_cancel_unknown_reservation_shows_backend_error() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .post(ctx.url("/reservations/9/cancel"))
        .send()
        .await
        .expect("Failed to cancel reservation");

    assert!(
        resp.url()
            .query()
            .is_some_and(|query| query.starts_with("error="))
    );
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("No active reservation found"));
}
