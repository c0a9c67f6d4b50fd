//! Library backend API client.
//!
//! The backend is a JSON REST API that issues bearer tokens on login and
//! scopes every other endpoint to the authenticated member. All requests
//! go through this client; route handlers never talk to the backend
//! directly.
//!
//! # Error shape
//!
//! The backend signals failures two ways: an `error` key in an otherwise
//! 2xx-shaped JSON body never happens, but non-2xx responses carry either
//! `{"error": "..."}` or `{"message": "..."}`. [`LibraryError`] folds both
//! into typed variants so handlers can distinguish an expired token from a
//! business-rule rejection (say, borrowing with unpaid fines).
//!
//! # Example
//!
//! ```rust,ignore
//! use shelfside_portal::library::{LibraryClient, LoginRequest};
//!
//! let client = LibraryClient::new(&config.library)?;
//!
//! let session = client
//!     .login(&LoginRequest {
//!         email: "member@example.com".to_string(),
//!         password: "secret".to_string(),
//!     })
//!     .await?;
//!
//! let books = client.list_books(&session.access_token).await?;
//! ```

mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::instrument;

use shelfside_core::{BookId, ReservationId};

use crate::config::LibraryApiConfig;

/// Errors returned by the library backend client.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The access token was missing, expired, or revoked (HTTP 401).
    #[error("Not authenticated")]
    Unauthorized,

    /// The backend refused the operation for this member (HTTP 403).
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// The backend rejected the request and explained why.
    #[error("{0}")]
    Backend(String),

    /// The backend returned a status the portal does not understand.
    #[error("Library API returned {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

/// Success or error message envelope used by the backend's mutation
/// endpoints.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiMessage {
    /// Text to show for a successful mutation.
    fn into_text(self) -> Option<String> {
        self.message.or(self.error)
    }

    /// Text to show for a failed request.
    fn into_error_text(self) -> Option<String> {
        self.error.or(self.message)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Library Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the library backend API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct LibraryClient {
    inner: Arc<LibraryClientInner>,
}

struct LibraryClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl LibraryClient {
    /// Create a new library backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &LibraryApiConfig) -> Result<Self, LibraryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let base_url = config.base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            inner: Arc::new(LibraryClientInner { client, base_url }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// Exchange credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Backend`] with the backend's message when the
    /// credentials are rejected. A 401 here is a credential failure, not an
    /// expired session, so it is not mapped to [`LibraryError::Unauthorized`].
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, LibraryError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/login"))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(message_error(status, &text));
        }

        parse_json(&text)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Backend`] with the backend's message when
    /// registration is rejected (duplicate email, weak password, ...).
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), LibraryError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/signup"))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(message_error(status, &text));
        }

        Ok(())
    }

    /// Get the authenticated member's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn profile(&self, access_token: &str) -> Result<Profile, LibraryError> {
        self.request(Method::GET, "/auth/profile", access_token)
            .await
    }

    /// Update the authenticated member's name and, optionally, password.
    ///
    /// Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token, request))]
    pub async fn update_profile(
        &self,
        access_token: &str,
        request: &ProfileEditRequest,
    ) -> Result<String, LibraryError> {
        let message: ApiMessage = self
            .request_with_body(Method::PUT, "/auth/profile/edit", access_token, request)
            .await?;
        Ok(message.into_text().unwrap_or_default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog & Borrowing
    // ─────────────────────────────────────────────────────────────────────────

    /// List the full book catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn list_books(&self, access_token: &str) -> Result<Vec<BookSummary>, LibraryError> {
        self.request(Method::GET, "/books/", access_token).await
    }

    /// Borrow a book. Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Forbidden`] when the backend blocks the loan,
    /// for example over unpaid fines or the borrow limit.
    #[instrument(skip(self, access_token), fields(book_id = %book_id))]
    pub async fn borrow_book(
        &self,
        access_token: &str,
        book_id: BookId,
    ) -> Result<String, LibraryError> {
        self.request_message(Method::POST, &format!("/books/borrow/{book_id}"), access_token)
            .await
    }

    /// List the member's current loans.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn borrowed_books(
        &self,
        access_token: &str,
    ) -> Result<Vec<BorrowedBook>, LibraryError> {
        self.request(Method::GET, "/students/books/borrowed", access_token)
            .await
    }

    /// Return a borrowed book. Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token), fields(book_id = %book_id))]
    pub async fn return_book(
        &self,
        access_token: &str,
        book_id: BookId,
    ) -> Result<String, LibraryError> {
        self.request_message(
            Method::POST,
            &format!("/students/books/return/{book_id}"),
            access_token,
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fines & Payments
    // ─────────────────────────────────────────────────────────────────────────

    /// List the member's fines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn fines(&self, access_token: &str) -> Result<Vec<Fine>, LibraryError> {
        self.request(Method::GET, "/payments/view", access_token)
            .await
    }

    /// Ask the backend to open a payment order for the given amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected. A gateway
    /// rejection is not an error; it comes back as a [`PaymentOrder`] with
    /// no `order_id`.
    #[instrument(skip(self, access_token, request))]
    pub async fn create_payment(
        &self,
        access_token: &str,
        request: &CreatePaymentRequest,
    ) -> Result<PaymentOrder, LibraryError> {
        self.request_with_body(
            Method::POST,
            "/payments/create-payment",
            access_token,
            request,
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reservations
    // ─────────────────────────────────────────────────────────────────────────

    /// List the member's reservations.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn reservations(&self, access_token: &str) -> Result<Vec<Reservation>, LibraryError> {
        self.request(Method::GET, "/reservations/view", access_token)
            .await
    }

    /// Reserve a book that has no available copies. Returns the backend's
    /// confirmation message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token), fields(book_id = %book_id))]
    pub async fn reserve_book(
        &self,
        access_token: &str,
        book_id: BookId,
    ) -> Result<String, LibraryError> {
        self.request_message(
            Method::POST,
            &format!("/reservations/reserve/{book_id}"),
            access_token,
        )
        .await
    }

    /// Cancel a pending reservation. Returns the backend's confirmation
    /// message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token), fields(reservation_id = %reservation_id))]
    pub async fn cancel_reservation(
        &self,
        access_token: &str,
        reservation_id: ReservationId,
    ) -> Result<String, LibraryError> {
        self.request_message(
            Method::DELETE,
            &format!("/reservations/cancel/{reservation_id}"),
            access_token,
        )
        .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications & Reports
    // ─────────────────────────────────────────────────────────────────────────

    /// List the member's notification history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn notifications(
        &self,
        access_token: &str,
    ) -> Result<Vec<Notification>, LibraryError> {
        self.request(Method::GET, "/notifications/view", access_token)
            .await
    }

    /// Fetch the library-wide counters for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or token is rejected.
    #[instrument(skip(self, access_token))]
    pub async fn report_stats(&self, access_token: &str) -> Result<ReportStats, LibraryError> {
        self.request(Method::GET, "/admin/reports", access_token)
            .await
    }

    /// Check that the backend answers HTTP at all. Any response counts,
    /// including 404; only transport failures are errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), LibraryError> {
        self.inner.client.get(self.url("/")).send().await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request Execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Execute an authenticated request with no body and parse the JSON
    /// response.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
    ) -> Result<T, LibraryError> {
        let response = self
            .inner
            .client
            .request(method, self.url(path))
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await?;

        read_json(response).await
    }

    /// Execute an authenticated request with a JSON body and parse the JSON
    /// response.
    async fn request_with_body<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
        body: &B,
    ) -> Result<T, LibraryError> {
        let response = self
            .inner
            .client
            .request(method, self.url(path))
            .header("Authorization", format!("Bearer {access_token}"))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        read_json(response).await
    }

    /// Execute an authenticated request whose response is a message
    /// envelope, returning the text to surface to the member.
    async fn request_message(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
    ) -> Result<String, LibraryError> {
        let message: ApiMessage = self.request(method, path, access_token).await?;
        Ok(message.into_text().unwrap_or_default())
    }
}

/// Read a response body as text first for better error diagnostics, then
/// map non-success statuses and parse the JSON.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, LibraryError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %text.chars().take(500).collect::<String>(),
            "Library API returned non-success status"
        );
        return Err(error_for_status(status, &text));
    }

    parse_json(&text)
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, LibraryError> {
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse library API response"
            );
            Err(LibraryError::Parse(e))
        }
    }
}

/// Map a non-success status from an authenticated endpoint.
fn error_for_status(status: StatusCode, body: &str) -> LibraryError {
    match status {
        StatusCode::UNAUTHORIZED => LibraryError::Unauthorized,
        StatusCode::FORBIDDEN => LibraryError::Forbidden(
            serde_json::from_str::<ApiMessage>(body)
                .ok()
                .and_then(ApiMessage::into_error_text)
                .unwrap_or_else(|| "Access denied".to_string()),
        ),
        _ => message_error(status, body),
    }
}

/// Map a non-success status where 401 carries no session meaning
/// (login and signup).
fn message_error(status: StatusCode, body: &str) -> LibraryError {
    serde_json::from_str::<ApiMessage>(body)
        .ok()
        .and_then(ApiMessage::into_error_text)
        .map_or_else(
            || LibraryError::UnexpectedStatus {
                status,
                body: body.chars().take(200).collect(),
            },
            LibraryError::Backend,
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> LibraryClient {
        LibraryClient::new(&LibraryApiConfig {
            base_url: base_url.parse().unwrap(),
            timeout: std::time::Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = test_client("http://localhost:5000/");
        assert_eq!(client.url("/books/"), "http://localhost:5000/books/");

        let client = test_client("http://localhost:5000");
        assert_eq!(client.url("/auth/login"), "http://localhost:5000/auth/login");
    }

    #[test]
    fn test_error_for_status_401_is_unauthorized() {
        let err = error_for_status(StatusCode::UNAUTHORIZED, r#"{"msg": "Token has expired"}"#);
        assert!(matches!(err, LibraryError::Unauthorized));
    }

    #[test]
    fn test_error_for_status_403_carries_backend_message() {
        let err = error_for_status(
            StatusCode::FORBIDDEN,
            r#"{"error": "You have unpaid fines. Please clear them before borrowing."}"#,
        );
        match err {
            LibraryError::Forbidden(message) => {
                assert_eq!(
                    message,
                    "You have unpaid fines. Please clear them before borrowing."
                );
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn test_error_for_status_403_without_body_uses_default() {
        let err = error_for_status(StatusCode::FORBIDDEN, "");
        match err {
            LibraryError::Forbidden(message) => assert_eq!(message, "Access denied"),
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn test_error_for_status_400_surfaces_message() {
        let err = error_for_status(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Book is available. No need to reserve."}"#,
        );
        match err {
            LibraryError::Backend(message) => {
                assert_eq!(message, "Book is available. No need to reserve.");
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[test]
    fn test_error_for_status_unexpected_truncates_body() {
        let body = "x".repeat(1000);
        let err = error_for_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            LibraryError::UnexpectedStatus { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body.len(), 200);
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_message_error_does_not_map_401_to_unauthorized() {
        let err = message_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error": "Invalid email or password"}"#,
        );
        match err {
            LibraryError::Backend(message) => assert_eq!(message, "Invalid email or password"),
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[test]
    fn test_api_message_prefers_error_text_for_failures() {
        let envelope: ApiMessage =
            serde_json::from_str(r#"{"message": "partial", "error": "boom"}"#).unwrap();
        assert_eq!(envelope.into_error_text().unwrap(), "boom");
    }

    #[test]
    fn test_api_message_prefers_message_text_for_successes() {
        let envelope: ApiMessage =
            serde_json::from_str(r#"{"message": "Book borrowed successfully", "error": null}"#)
                .unwrap();
        assert_eq!(envelope.into_text().unwrap(), "Book borrowed successfully");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LibraryError::Unauthorized.to_string(),
            "Not authenticated"
        );
        assert_eq!(
            LibraryError::Forbidden("no".to_string()).to_string(),
            "Access denied: no"
        );
        assert_eq!(
            LibraryError::Backend("Book not found".to_string()).to_string(),
            "Book not found"
        );
    }
}
