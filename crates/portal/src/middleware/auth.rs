//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in member in route handlers.
//! Guards resolve fully before the handler runs, so a page never starts
//! fetching data for a visitor who is about to be turned away.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::FORBIDDEN_REDIRECT;
use crate::library::Profile;
use crate::models::{AuthSession, session_keys};
use crate::state::AppState;

/// Extractor that requires a stored session.
///
/// Checks only that a login has happened on this browser; the token itself
/// is validated by whichever backend call the page makes next. Visitors
/// without a session are redirected to the error page before any backend
/// traffic happens.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(auth): RequireAuth,
/// ) -> impl IntoResponse {
///     // auth.access_token is ready to attach to backend requests
/// }
/// ```
pub struct RequireAuth(pub AuthSession);

/// Extractor that requires a session whose profile resolves to an admin.
///
/// Makes one backend call to verify the role before the handler runs.
pub struct RequireAdmin {
    pub auth: AuthSession,
    pub profile: Profile,
}

/// Extractor that requires a session whose profile resolves to a student.
///
/// Makes one backend call to verify the role before the handler runs.
pub struct RequireStudent {
    pub auth: AuthSession,
    pub profile: Profile,
}

/// Rejection for all auth extractors: send the browser to the error page.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(FORBIDDEN_REDIRECT).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let auth: AuthSession = session
            .get(session_keys::AUTH_SESSION)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(auth))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (auth, profile) = verified_profile(parts, state).await?;

        if profile.role.is_admin() {
            Ok(Self { auth, profile })
        } else {
            Err(AuthRejection)
        }
    }
}

impl<S> FromRequestParts<S> for RequireStudent
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (auth, profile) = verified_profile(parts, state).await?;

        if profile.role.is_admin() {
            Err(AuthRejection)
        } else {
            Ok(Self { auth, profile })
        }
    }
}

/// Shared step for the role-checked extractors: require a session, then ask
/// the backend who the token belongs to.
async fn verified_profile<S>(
    parts: &mut Parts,
    state: &S,
) -> Result<(AuthSession, Profile), AuthRejection>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    let RequireAuth(auth) = RequireAuth::from_request_parts(parts, state).await?;

    let app_state = AppState::from_ref(state);
    let profile = app_state
        .library()
        .profile(&auth.access_token)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Profile lookup failed during role check");
            AuthRejection
        })?;

    Ok((auth, profile))
}

/// Extractor that optionally gets the current session.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in.
pub struct OptionalAuth(pub Option<AuthSession>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<AuthSession>(session_keys::AUTH_SESSION)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(auth))
    }
}

/// Helper to store the authentication state in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_session(
    session: &Session,
    auth: &AuthSession,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::AUTH_SESSION, auth).await
}

/// Helper to clear the authentication state from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<AuthSession>(session_keys::AUTH_SESSION).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;
    use shelfside_core::Role;
    use std::sync::Arc;
    use tower_sessions::{MemoryStore, Session};

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn parts_with_session(session: Session) -> Parts {
        let request = Request::builder().uri("/books").body(()).unwrap();
        let (mut parts, ()) = request.into_parts();
        parts.extensions.insert(session);
        parts
    }

    #[tokio::test]
    async fn test_require_auth_rejects_without_session_layer() {
        let request = Request::builder().uri("/books").body(()).unwrap();
        let (mut parts, ()) = request.into_parts();

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_require_auth_rejects_empty_session() {
        let mut parts = parts_with_session(session());

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_require_auth_returns_stored_state() {
        let session = session();
        let auth = AuthSession {
            access_token: "tok-9".to_string(),
            role: Role::Student,
        };
        set_auth_session(&session, &auth).await.unwrap();

        let mut parts = parts_with_session(session);
        let Ok(RequireAuth(found)) = RequireAuth::from_request_parts(&mut parts, &()).await else {
            panic!("expected stored auth state");
        };

        assert_eq!(found.access_token, "tok-9");
    }

    #[tokio::test]
    async fn test_clear_auth_session_is_idempotent() {
        let session = session();
        let auth = AuthSession {
            access_token: "tok-1".to_string(),
            role: Role::Student,
        };
        set_auth_session(&session, &auth).await.unwrap();

        clear_auth_session(&session).await.unwrap();
        clear_auth_session(&session).await.unwrap();

        let remaining: Option<AuthSession> =
            session.get(session_keys::AUTH_SESSION).await.unwrap();
        assert!(remaining.is_none());
    }

    #[tokio::test]
    async fn test_optional_auth_is_none_for_visitors() {
        let mut parts = parts_with_session(session());

        let OptionalAuth(auth) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(auth.is_none());
    }

    #[tokio::test]
    async fn test_auth_rejection_redirects_to_error_page() {
        let response = AuthRejection.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::LOCATION)
                .unwrap(),
            FORBIDDEN_REDIRECT
        );
    }
}
