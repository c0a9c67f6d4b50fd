//! Wire types for the library backend API.
//!
//! Field names and formats follow the backend's JSON responses exactly.
//! Timestamps other than `due_date` arrive in whatever format the backend's
//! JSON encoder produces, so they are kept as strings and parsed lazily for
//! display.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shelfside_core::{
    BookId, Email, FineId, Money, PaymentStatus, ReservationId, ReservationStatus, Role, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Body for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/signup`.
#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub role: Role,
}

/// Body for `PUT /auth/profile/edit`.
///
/// `password` is omitted entirely when the member leaves it blank, so the
/// backend keeps the current one.
#[derive(Debug, Serialize)]
pub struct ProfileEditRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Body for `POST /payments/create-payment`.
///
/// The backend expects `amount` as a JSON number, not the string form
/// `rust_decimal` serializes by default.
#[derive(Debug, Serialize)]
pub struct CreatePaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

/// Response from `POST /auth/login`.
///
/// Older backend versions omit `role`, in which case the caller falls back
/// to the default member role.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Response from `GET /auth/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
}

/// One catalog entry from `GET /books/`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies_available: u32,
}

impl BookSummary {
    /// Whether the catalog page offers a borrow control for this book.
    /// Books with no copies left offer a reservation instead.
    #[must_use]
    pub const fn is_borrowable(&self) -> bool {
        self.copies_available > 0
    }
}

/// One entry from `GET /students/books/borrowed`.
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowedBook {
    pub id: BookId,
    pub title: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub fine_due: Option<Money>,
}

/// One entry from `GET /payments/view`.
#[derive(Debug, Clone, Deserialize)]
pub struct Fine {
    pub id: FineId,
    pub amount: Money,
    pub payment_status: PaymentStatus,
}

/// Response from `POST /payments/create-payment`.
///
/// `order_id` is absent when the payment gateway rejected the order.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOrder {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Money>,
}

/// One entry from `GET /reservations/view`.
#[derive(Debug, Clone, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub book_title: String,
    pub reserved_at: String,
    pub status: ReservationStatus,
}

impl Reservation {
    /// Parse the raw `reserved_at` timestamp, if the backend sent a
    /// recognizable format.
    #[must_use]
    pub fn reserved_at_datetime(&self) -> Option<NaiveDateTime> {
        parse_backend_datetime(&self.reserved_at)
    }
}

/// One entry from `GET /notifications/view`.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub message: String,
    pub notification_type: String,
    pub sent_at: String,
}

impl Notification {
    /// Parse the raw `sent_at` timestamp, if the backend sent a
    /// recognizable format.
    #[must_use]
    pub fn sent_at_datetime(&self) -> Option<NaiveDateTime> {
        parse_backend_datetime(&self.sent_at)
    }
}

/// Response from `GET /admin/reports`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportStats {
    #[serde(default)]
    pub total_books: u64,
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub borrowed_books: u64,
}

/// Parse a backend timestamp in any of the formats the backend has been
/// observed to emit: RFC 3339, RFC 2822, or `YYYY-MM-DD HH:MM:SS`.
fn parse_backend_datetime(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok())
}
