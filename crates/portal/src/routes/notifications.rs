//! Notifications route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::library::Notification;
use crate::middleware::RequireAuth;
use crate::routes::MessageQuery;
use crate::state::AppState;

/// A notification row with the timestamp formatted for display.
#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub message: String,
    pub kind: String,
    pub sent_at: String,
}

impl From<Notification> for NotificationRow {
    fn from(notification: Notification) -> Self {
        let sent_at = notification.sent_at_datetime().map_or_else(
            || notification.sent_at.clone(),
            |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
        );

        Self {
            message: notification.message,
            kind: notification.notification_type,
            sent_at,
        }
    }
}

/// Notifications template.
#[derive(Template, WebTemplate)]
#[template(path = "notifications/index.html")]
pub struct NotificationsTemplate {
    pub notifications: Vec<NotificationRow>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the member's notification history.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<NotificationsTemplate, AppError> {
    let notifications = state
        .library()
        .notifications(&auth.access_token)
        .await?
        .into_iter()
        .map(NotificationRow::from)
        .collect();

    Ok(NotificationsTemplate {
        notifications,
        error: query.error,
        success: query.success,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_formats_timestamp_and_keeps_kind() {
        let row = NotificationRow::from(Notification {
            message: "Your book is due tomorrow".to_string(),
            notification_type: "due_date".to_string(),
            sent_at: "2026-03-08T09:00:00Z".to_string(),
        });

        assert_eq!(row.kind, "due_date");
        assert_eq!(row.sent_at, "2026-03-08 09:00");
    }
}
