//! Dashboard route handlers.
//!
//! Both dashboards sit behind role guards that re-check the role against
//! the backend profile, so a stale session role cannot unlock the wrong
//! page. The student numbers are derived here from the loan list; the
//! backend has no endpoint for them.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::{NaiveDate, Utc};
use tracing::instrument;

use shelfside_core::types::Money;

use crate::error::AppError;
use crate::filters;
use crate::library::{BorrowedBook, ReportStats};
use crate::middleware::{RequireAdmin, RequireStudent};
use crate::state::AppState;

// =============================================================================
// Student Dashboard
// =============================================================================

/// Headline numbers for the student dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudentStats {
    pub books_borrowed: usize,
    pub due_books: usize,
    pub pending_fines: Money,
}

impl StudentStats {
    /// Derive the dashboard numbers from the member's loan list.
    ///
    /// A loan counts as due once its due date has started, so a book due
    /// today is already in the due column.
    fn from_entries(entries: &[BorrowedBook], today: NaiveDate) -> Self {
        Self {
            books_borrowed: entries.len(),
            due_books: entries.iter().filter(|b| b.due_date <= today).count(),
            pending_fines: entries.iter().filter_map(|b| b.fine_due).sum(),
        }
    }
}

/// Student dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/student.html")]
pub struct StudentDashboardTemplate {
    pub name: String,
    pub stats: StudentStats,
}

/// Display the student dashboard.
#[instrument(skip(state, student))]
pub async fn student(
    State(state): State<AppState>,
    student: RequireStudent,
) -> Result<StudentDashboardTemplate, AppError> {
    let entries = state
        .library()
        .borrowed_books(&student.auth.access_token)
        .await?;
    let stats = StudentStats::from_entries(&entries, Utc::now().date_naive());

    Ok(StudentDashboardTemplate {
        name: student.profile.name,
        stats,
    })
}

// =============================================================================
// Admin Dashboard
// =============================================================================

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/admin.html")]
pub struct AdminDashboardTemplate {
    pub name: String,
    pub stats: ReportStats,
}

/// Display the admin dashboard.
#[instrument(skip(state, admin))]
pub async fn admin(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<AdminDashboardTemplate, AppError> {
    let stats = state
        .library()
        .report_stats(&admin.auth.access_token)
        .await?;

    Ok(AdminDashboardTemplate {
        name: admin.profile.name,
        stats,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shelfside_core::types::BookId;

    use super::*;

    fn loan(id: i32, due: &str, fine: Option<Decimal>) -> BorrowedBook {
        BorrowedBook {
            id: BookId::new(id),
            title: format!("Book {id}"),
            due_date: due.parse().unwrap(),
            fine_due: fine.map(Money::new),
        }
    }

    #[test]
    fn test_stats_from_empty_loan_list() {
        let stats = StudentStats::from_entries(&[], "2026-03-10".parse().unwrap());
        assert_eq!(stats.books_borrowed, 0);
        assert_eq!(stats.due_books, 0);
        assert_eq!(stats.pending_fines, Money::ZERO);
    }

    #[test]
    fn test_stats_counts_due_and_sums_fines() {
        let today: NaiveDate = "2026-03-10".parse().unwrap();
        let entries = vec![
            loan(1, "2026-03-01", Some(Decimal::new(450, 1))), // overdue, ₹45.0
            loan(2, "2026-03-10", None),                       // due today
            loan(3, "2026-03-20", Some(Decimal::new(5, 0))),   // not yet due, ₹5
        ];

        let stats = StudentStats::from_entries(&entries, today);
        assert_eq!(stats.books_borrowed, 3);
        assert_eq!(stats.due_books, 2);
        assert_eq!(stats.pending_fines, Money::new(Decimal::new(50, 0)));
    }

    #[test]
    fn test_stats_due_today_counts_as_due() {
        let today: NaiveDate = "2026-03-10".parse().unwrap();
        let entries = vec![loan(1, "2026-03-10", None)];

        let stats = StudentStats::from_entries(&entries, today);
        assert_eq!(stats.due_books, 1);
    }
}
