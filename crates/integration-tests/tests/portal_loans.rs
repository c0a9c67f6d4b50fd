//! Integration tests for the borrowed books page.

use shelfside_integration_tests::TestContext;

#[tokio::test]
async fn test_borrowed_list_renders_due_dates_and_fines() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .get(ctx.url("/borrowed"))
        .send()
        .await
        .expect("Failed to load loans");
    let body = resp.text().await.expect("Failed to read body");

    assert!(body.contains("The Rust Programming Language"));
    assert!(body.contains("2020-01-01"));
    assert!(body.contains("2099-01-01"));
    assert!(body.contains("₹45.50"));
    assert!(body.contains(r#"action="/borrowed/1/return""#));
    assert!(body.contains(r#"action="/borrowed/4/return""#));
}

#[tokio::test]
async fn test_return_redirects_back_with_message() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .post(ctx.url("/borrowed/1/return"))
        .send()
        .await
        .expect("Failed to return book");

    assert_eq!(resp.url().path(), "/borrowed");
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Book returned successfully"));

    assert_eq!(ctx.hits.count("return"), 1);
    assert_eq!(ctx.hits.count("borrowed"), 1);
}

#[tokio::test]
async fn test_return_unknown_book_shows_backend_error() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .post(ctx.url("/borrowed/9/return"))
        .send()
        .await
        .expect("Failed to return book");

    assert!(
        resp.url()
            .query()
            .is_some_and(|query| query.starts_with("error="))
    );
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("No active borrow record found"));
}
