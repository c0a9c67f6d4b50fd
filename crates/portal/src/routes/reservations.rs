//! Reservations route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use tracing::instrument;

use shelfside_core::types::{ReservationId, ReservationStatus};

use crate::error::AppError;
use crate::filters;
use crate::library::Reservation;
use crate::middleware::RequireAuth;
use crate::routes::{MessageQuery, flash_redirect};
use crate::state::AppState;

/// A reservation row with the timestamp formatted for display.
#[derive(Debug, Clone)]
pub struct ReservationRow {
    pub id: ReservationId,
    pub book_title: String,
    pub reserved_at: String,
    pub status: ReservationStatus,
}

impl From<Reservation> for ReservationRow {
    fn from(reservation: Reservation) -> Self {
        // The backend is loose about timestamp formats; show anything we
        // cannot parse as-is rather than dropping the row.
        let reserved_at = reservation.reserved_at_datetime().map_or_else(
            || reservation.reserved_at.clone(),
            |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
        );

        Self {
            id: reservation.id,
            book_title: reservation.book_title,
            reserved_at,
            status: reservation.status,
        }
    }
}

/// Reservations template.
#[derive(Template, WebTemplate)]
#[template(path = "reservations/index.html")]
pub struct ReservationsTemplate {
    pub reservations: Vec<ReservationRow>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the member's reservations.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<ReservationsTemplate, AppError> {
    let reservations = state
        .library()
        .reservations(&auth.access_token)
        .await?
        .into_iter()
        .map(ReservationRow::from)
        .collect();

    Ok(ReservationsTemplate {
        reservations,
        error: query.error,
        success: query.success,
    })
}

/// Cancel a reservation, then land back on the reservations page.
#[instrument(skip(state, auth))]
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(reservation_id): Path<ReservationId>,
) -> Result<Redirect, AppError> {
    let result = state
        .library()
        .cancel_reservation(&auth.access_token, reservation_id)
        .await;
    flash_redirect("/reservations", result)
}
