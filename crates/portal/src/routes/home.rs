//! Landing redirect.

use axum::response::Redirect;

use crate::middleware::OptionalAuth;

/// GET / - send the visitor wherever their session says they belong.
pub async fn home(OptionalAuth(auth): OptionalAuth) -> Redirect {
    match auth {
        Some(auth) if auth.is_admin() => Redirect::to("/dashboard/admin"),
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/auth/login"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;
    use axum::response::IntoResponse;

    use super::*;
    use crate::models::AuthSession;
    use shelfside_core::types::Role;

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        response
            .headers()
            .get(LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_home_redirects_logged_out_to_login() {
        let redirect = home(OptionalAuth(None)).await;
        assert_eq!(location(redirect), "/auth/login");
    }

    #[tokio::test]
    async fn test_home_redirects_student_to_dashboard() {
        let auth = AuthSession {
            access_token: "token".to_string(),
            role: Role::Student,
        };
        let redirect = home(OptionalAuth(Some(auth))).await;
        assert_eq!(location(redirect), "/dashboard");
    }

    #[tokio::test]
    async fn test_home_redirects_admin_to_admin_dashboard() {
        let auth = AuthSession {
            access_token: "token".to_string(),
            role: Role::Admin,
        };
        let redirect = home(OptionalAuth(Some(auth))).await;
        assert_eq!(location(redirect), "/dashboard/admin");
    }
}
