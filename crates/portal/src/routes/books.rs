//! Book catalog route handlers.
//!
//! The catalog is the one page every logged-in account sees the same way.
//! Each row offers exactly one action: borrow while copies remain, reserve
//! once they run out. The backend re-checks either way, so the buttons are
//! presentation, not enforcement.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use tracing::instrument;

use shelfside_core::types::BookId;

use crate::error::AppError;
use crate::filters;
use crate::library::BookSummary;
use crate::middleware::RequireAuth;
use crate::routes::{MessageQuery, flash_redirect};
use crate::state::AppState;

/// Book catalog template.
#[derive(Template, WebTemplate)]
#[template(path = "books/index.html")]
pub struct BooksTemplate {
    pub books: Vec<BookSummary>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the book catalog.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<BooksTemplate, AppError> {
    let books = state.library().list_books(&auth.access_token).await?;

    Ok(BooksTemplate {
        books,
        error: query.error,
        success: query.success,
    })
}

/// Borrow a book, then land back on the catalog with the outcome.
#[instrument(skip(state, auth))]
pub async fn borrow(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(book_id): Path<BookId>,
) -> Result<Redirect, AppError> {
    let result = state
        .library()
        .borrow_book(&auth.access_token, book_id)
        .await;
    flash_redirect("/books", result)
}

/// Reserve a book whose copies are all out.
#[instrument(skip(state, auth))]
pub async fn reserve(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(book_id): Path<BookId>,
) -> Result<Redirect, AppError> {
    let result = state
        .library()
        .reserve_book(&auth.access_token, book_id)
        .await;
    flash_redirect("/books", result)
}
