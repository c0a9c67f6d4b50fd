//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Authorization failures are not rendered in place: a rejected or missing
//! token redirects the browser to the shared error page, so every page
//! reaches it through the same path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::library::LibraryError;

/// Where browsers are sent when a request lacks a valid session or role.
pub const FORBIDDEN_REDIRECT: &str = "/error?type=403";

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Library backend call failed.
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // A rejected token means the stored session is stale. Send the
        // browser to the error page instead of rendering a broken table.
        if matches!(
            self,
            Self::Library(LibraryError::Unauthorized | LibraryError::Forbidden(_))
        ) {
            return Redirect::to(FORBIDDEN_REDIRECT).into_response();
        }

        // Capture server errors to Sentry
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        let status = match &self {
            Self::Library(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Library(_) => "External service error",
            Self::Session(_) => "Internal server error",
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user identifier.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
