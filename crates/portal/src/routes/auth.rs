//! Authentication route handlers.
//!
//! Handles login, signup, and logout against the library backend's JWT
//! auth endpoints. A successful login stores the bearer token and role in
//! the session; nothing credential-shaped ever reaches a template or log.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use shelfside_core::types::{Email, Role};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::library::{LibraryError, LoginRequest, SignupRequest};
use crate::middleware::{clear_auth_session, set_auth_session};
use crate::models::AuthSession;
use crate::routes::{MessageQuery, flash_success};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Account role from the signup dropdown. Missing means student.
    #[serde(default)]
    pub role: Role,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
}

/// Where a fresh login lands.
const fn landing_for(role: Role) -> &'static str {
    if role.is_admin() {
        "/dashboard/admin"
    } else {
        "/dashboard"
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
///
/// Rejections re-render the login page with the backend's message inline,
/// so the typed email survives a failed attempt and the URL stays clean.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let request = LoginRequest {
        email: form.email,
        password: form.password,
    };

    match state.library().login(&request).await {
        Ok(token) => {
            // Older backend builds omit the role on login; those accounts
            // are students.
            let role = token.role.unwrap_or_default();
            let auth = AuthSession {
                access_token: token.access_token,
                role,
            };

            if let Err(e) = set_auth_session(&session, &auth).await {
                tracing::error!("Failed to set session: {}", e);
                return LoginTemplate {
                    error: Some("Could not start a session. Please try again.".to_string()),
                    success: None,
                }
                .into_response();
            }

            set_sentry_user(&request.email, Some(&request.email));
            Redirect::to(landing_for(role)).into_response()
        }
        Err(LibraryError::Backend(message)) => {
            tracing::warn!("Login rejected: {}", message);
            LoginTemplate {
                error: Some(message),
                success: None,
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!("Login request failed: {}", e);
            LoginTemplate {
                error: Some(
                    "The library service is unavailable right now. Please try again shortly."
                        .to_string(),
                ),
                success: None,
            }
            .into_response()
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page() -> impl IntoResponse {
    SignupTemplate { error: None }
}

/// Handle signup form submission.
///
/// The email is validated here before the backend sees it; everything else
/// is the backend's call. Success lands on the login page with a banner
/// rather than logging the new account in.
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let email = match form.email.parse::<Email>() {
        Ok(email) => email,
        Err(e) => {
            return SignupTemplate {
                error: Some(e.to_string()),
            }
            .into_response();
        }
    };

    let request = SignupRequest {
        name: form.name,
        email,
        password: form.password,
        role: form.role,
    };

    match state.library().signup(&request).await {
        Ok(()) => flash_success("/auth/login", "Signup successful! Please login.").into_response(),
        Err(LibraryError::Backend(message)) => {
            tracing::warn!("Signup rejected: {}", message);
            SignupTemplate {
                error: Some(message),
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!("Signup request failed: {}", e);
            SignupTemplate {
                error: Some(
                    "The library service is unavailable right now. Please try again shortly."
                        .to_string(),
                ),
            }
            .into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// The backend issues stateless tokens, so logout is purely local: drop the
/// stored auth state and destroy the session record.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_auth_session(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    clear_sentry_user();
    Redirect::to("/auth/login")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_for_sends_each_role_to_its_dashboard() {
        assert_eq!(landing_for(Role::Student), "/dashboard");
        assert_eq!(landing_for(Role::Admin), "/dashboard/admin");
    }

    #[test]
    fn test_signup_form_defaults_to_student_role() {
        let form: SignupForm = serde_json::from_str(
            r#"{"name":"Asha","email":"asha@example.com","password":"pw"}"#,
        )
        .unwrap();
        assert_eq!(form.role, Role::Student);
    }

    #[test]
    fn test_signup_form_parses_admin_role() {
        let form: SignupForm = serde_json::from_str(
            r#"{"name":"Asha","email":"asha@example.com","password":"pw","role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(form.role, Role::Admin);
    }
}
