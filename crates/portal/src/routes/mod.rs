//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Redirect by role (login page if logged out)
//! GET  /error                   - Error page (?type=403 for access denied)
//! GET  /health                  - Health check
//! GET  /health/ready            - Readiness check (pings the backend)
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Login action
//! GET  /auth/signup             - Signup page
//! POST /auth/signup             - Signup action
//! POST /auth/logout             - Logout action
//!
//! # Dashboards (role checked against the backend)
//! GET  /dashboard               - Student dashboard
//! GET  /dashboard/admin         - Admin dashboard
//!
//! # Catalog
//! GET  /books                   - Book catalog
//! POST /books/{id}/borrow       - Borrow a book
//! POST /books/{id}/reserve      - Reserve a book with no copies left
//!
//! # Loans
//! GET  /borrowed                - Current loans
//! POST /borrowed/{id}/return    - Return a borrowed book
//!
//! # Fines
//! GET  /fines                   - Fines list
//! POST /fines/{id}/pay          - Start a payment for a fine
//!
//! # Reservations
//! GET  /reservations            - Reservations list
//! POST /reservations/{id}/cancel - Cancel a reservation
//!
//! # Notifications
//! GET  /notifications           - Notification history
//!
//! # Profile
//! GET  /profile                 - Profile page
//! POST /profile                 - Update name and password
//! ```
//!
//! Mutating actions never render anything themselves: they redirect back to
//! the page they came from with the outcome in the query string, and the
//! page's GET handler re-fetches the list and shows the banner. One action,
//! one re-fetch.

pub mod auth;
pub mod books;
pub mod borrowed;
pub mod dashboard;
pub mod error_page;
pub mod fines;
pub mod home;
pub mod notifications;
pub mod profile;
pub mod reservations;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::library::LibraryError;
use crate::state::AppState;

/// Query parameters for error/success display.
///
/// Every list page accepts these; mutation handlers fill them in via
/// [`flash_success`] and [`flash_error`].
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Redirect back to `path` with a success banner.
pub(crate) fn flash_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?success={}", urlencoding::encode(message)))
}

/// Redirect back to `path` with an error banner.
pub(crate) fn flash_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(message)))
}

/// Turn a mutation outcome into a flash redirect back to `path`.
///
/// The backend's business-rule rejections (borrow limit, unpaid fines,
/// nothing to cancel) become the error banner. An expired token or a
/// transport failure propagates instead, so those keep their usual
/// handling.
pub(crate) fn flash_redirect(
    path: &str,
    result: Result<String, LibraryError>,
) -> Result<Redirect, AppError> {
    match result {
        Ok(message) => Ok(flash_success(path, &message)),
        Err(LibraryError::Forbidden(message) | LibraryError::Backend(message)) => {
            Ok(flash_error(path, &message))
        }
        Err(e) => Err(AppError::Library(e)),
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::student))
        .route("/admin", get(dashboard::admin))
}

/// Create the catalog routes router.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::index))
        .route("/{id}/borrow", post(books::borrow))
        .route("/{id}/reserve", post(books::reserve))
}

/// Create the loans routes router.
pub fn borrowed_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(borrowed::index))
        .route("/{id}/return", post(borrowed::return_book))
}

/// Create the fines routes router.
pub fn fine_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(fines::index))
        .route("/{id}/pay", post(fines::pay))
}

/// Create the reservations routes router.
pub fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(reservations::index))
        .route("/{id}/cancel", post(reservations::cancel))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Landing redirect
        .route("/", get(home::home))
        // Shared error page
        .route("/error", get(error_page::show))
        // Auth routes
        .nest("/auth", auth_routes())
        // Dashboards
        .nest("/dashboard", dashboard_routes())
        // Catalog
        .nest("/books", book_routes())
        // Loans
        .nest("/borrowed", borrowed_routes())
        // Fines
        .nest("/fines", fine_routes())
        // Reservations
        .nest("/reservations", reservation_routes())
        // Notifications
        .route("/notifications", get(notifications::index))
        // Profile
        .route("/profile", get(profile::show).post(profile::update))
}
