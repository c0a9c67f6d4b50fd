//! Profile route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::{Query, State};
use axum::response::Redirect;
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::library::{Profile, ProfileEditRequest};
use crate::middleware::RequireAuth;
use crate::routes::{MessageQuery, flash_redirect};
use crate::state::AppState;

/// Profile edit form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    /// Blank means keep the current password.
    pub password: Option<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub name: String,
    pub email: String,
    pub role: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl ProfileTemplate {
    fn new(profile: Profile, query: MessageQuery) -> Self {
        Self {
            name: profile.name,
            email: profile.email,
            role: profile.role.to_string(),
            error: query.error,
            success: query.success,
        }
    }
}

/// Display the member's profile.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<ProfileTemplate, AppError> {
    let profile = state.library().profile(&auth.access_token).await?;
    Ok(ProfileTemplate::new(profile, query))
}

/// Update the member's name and, optionally, password.
#[instrument(skip(state, auth, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, AppError> {
    let request = ProfileEditRequest {
        name: form.name,
        password: form.password.filter(|p| !p.is_empty()),
    };

    let result = state
        .library()
        .update_profile(&auth.access_token, &request)
        .await;
    flash_redirect("/profile", result)
}
