//! Borrowed books route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use tracing::instrument;

use shelfside_core::types::BookId;

use crate::error::AppError;
use crate::filters;
use crate::library::BorrowedBook;
use crate::middleware::RequireAuth;
use crate::routes::{MessageQuery, flash_redirect};
use crate::state::AppState;

/// A loan row, dates and fines already formatted for display.
#[derive(Debug, Clone)]
pub struct LoanRow {
    pub book_id: BookId,
    pub title: String,
    pub due_date: String,
    pub fine_due: Option<String>,
}

impl From<BorrowedBook> for LoanRow {
    fn from(book: BorrowedBook) -> Self {
        Self {
            book_id: book.id,
            title: book.title,
            due_date: book.due_date.format("%Y-%m-%d").to_string(),
            fine_due: book.fine_due.map(|fine| fine.to_string()),
        }
    }
}

/// Borrowed books template.
#[derive(Template, WebTemplate)]
#[template(path = "borrowed/index.html")]
pub struct BorrowedTemplate {
    pub loans: Vec<LoanRow>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the member's current loans.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<BorrowedTemplate, AppError> {
    let loans = state
        .library()
        .borrowed_books(&auth.access_token)
        .await?
        .into_iter()
        .map(LoanRow::from)
        .collect();

    Ok(BorrowedTemplate {
        loans,
        error: query.error,
        success: query.success,
    })
}

/// Return a borrowed book, then land back on the loans page.
#[instrument(skip(state, auth))]
pub async fn return_book(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(book_id): Path<BookId>,
) -> Result<Redirect, AppError> {
    let result = state
        .library()
        .return_book(&auth.access_token, book_id)
        .await;
    flash_redirect("/borrowed", result)
}
