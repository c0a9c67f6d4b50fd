//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use shelfside_core::Role;

/// Session-stored authentication state.
///
/// The portal keeps only the backend-issued bearer token and the role it
/// reported at login. Everything else is fetched fresh per page load.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token attached to every backend request.
    pub access_token: String,
    /// Role the backend reported at login.
    pub role: Role,
}

impl AuthSession {
    /// Whether this session belongs to an admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// Hand-written so the token cannot leak through tracing fields.
impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the logged-in member's authentication state.
    pub const AUTH_SESSION: &str = "auth_session";
}
