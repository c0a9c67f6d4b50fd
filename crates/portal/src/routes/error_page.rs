//! Shared error page.
//!
//! Guard rejections and the error responses in [`crate::error`] all land
//! here, so the browser always gets a real page instead of a bare status
//! code.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Query;
use serde::Deserialize;

use crate::filters;

/// Query parameters for the error page.
#[derive(Debug, Deserialize)]
pub struct ErrorPageQuery {
    /// Error category, e.g. `403`. Anything else gets the generic page.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Error page template.
#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub heading: &'static str,
    pub detail: &'static str,
}

/// Display the error page.
pub async fn show(Query(query): Query<ErrorPageQuery>) -> ErrorTemplate {
    match query.kind.as_deref() {
        Some("403") => ErrorTemplate {
            heading: "Access denied",
            detail: "You do not have permission to view that page. Log in with an account that does, or head back to your dashboard.",
        },
        _ => ErrorTemplate {
            heading: "Something went wrong",
            detail: "The page could not be loaded. Please try again in a moment.",
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_show_renders_access_denied_for_403() {
        let template = show(Query(ErrorPageQuery {
            kind: Some("403".to_string()),
        }))
        .await;
        let html = template.render().unwrap();
        assert!(html.contains("Access denied"));
    }

    #[tokio::test]
    async fn test_show_renders_generic_page_otherwise() {
        let template = show(Query(ErrorPageQuery { kind: None })).await;
        let html = template.render().unwrap();
        assert!(html.contains("Something went wrong"));
    }
}
