//! Integration tests for the book catalog: rendering, borrow, reserve.
//!
//! The interesting property is the cost model: a mutation is exactly one
//! backend POST followed by exactly one list re-fetch, whether the backend
//! accepted the action or not.

use shelfside_integration_tests::TestContext;

#[tokio::test]
async fn test_catalog_offers_borrow_or_reserve_per_row() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .get(ctx.url("/books"))
        .send()
        .await
        .expect("Failed to load catalog");
    let body = resp.text().await.expect("Failed to read body");

    assert!(body.contains("The Rust Programming Language"));
    assert!(body.contains("Dune"));

    // Books with copies left get a borrow form, the exhausted one a reserve
    // form.
    assert!(body.contains(r#"action="/books/1/borrow""#));
    assert!(body.contains(r#"action="/books/3/borrow""#));
    assert!(body.contains(r#"action="/books/2/reserve""#));
    assert!(!body.contains(r#"action="/books/2/borrow""#));

    assert_eq!(ctx.hits.count("books"), 1);
}

#[tokio::test]
async fn test_borrow_redirects_back_with_one_refetch() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    ctx.client
        .get(ctx.url("/books"))
        .send()
        .await
        .expect("Failed to load catalog");

    let resp = ctx
        .client
        .post(ctx.url("/books/1/borrow"))
        .send()
        .await
        .expect("Failed to borrow");

    assert_eq!(resp.url().path(), "/books");
    assert!(
        resp.url()
            .query()
            .is_some_and(|query| query.starts_with("success="))
    );
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Book borrowed successfully"));

    // One POST, and the redirect re-fetched the list exactly once.
    assert_eq!(ctx.hits.count("borrow"), 1);
    assert_eq!(ctx.hits.count("books"), 2);
}

#[tokio::test]
async fn test_borrow_rejection_becomes_an_error_banner() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .post(ctx.url("/books/3/borrow"))
        .send()
        .await
        .expect("Failed to borrow");

    assert_eq!(resp.url().path(), "/books");
    assert!(
        resp.url()
            .query()
            .is_some_and(|query| query.starts_with("error="))
    );
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("You have unpaid fines. Clear them to borrow books."));

    // The rejected action still costs one POST and one re-fetch, no retry.
    assert_eq!(ctx.hits.count("borrow"), 1);
    assert_eq!(ctx.hits.count("books"), 1);
}

#[tokio::test]
async fn test_reserve_an_exhausted_book() {
    let ctx = TestContext::new().await;
    ctx.login_as_student().await;

    let resp = ctx
        .client
        .post(ctx.url("/books/2/reserve"))
        .send()
        .await
        .expect("Failed to reserve");

    assert_eq!(resp.url().path(), "/books");
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Book reserved successfully"));
    assert_eq!(ctx.hits.count("reserve"), 1);
}
