//! Fines route handlers.
//!
//! Paying a fine only opens a payment order with the backend's provider;
//! the fine flips to completed when the provider's callback lands on the
//! backend. Until then the row stays pending, which is also what keeps
//! borrowing blocked.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Form;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use shelfside_core::types::FineId;

use crate::error::AppError;
use crate::filters;
use crate::library::{CreatePaymentRequest, Fine, LibraryError, PaymentOrder};
use crate::middleware::RequireAuth;
use crate::routes::{MessageQuery, flash_error, flash_success};
use crate::state::AppState;

/// Pay form data. The amount rides along from the fine row.
#[derive(Debug, Deserialize)]
pub struct PayForm {
    pub amount: Decimal,
}

/// Fines template.
#[derive(Template, WebTemplate)]
#[template(path = "fines/index.html")]
pub struct FinesTemplate {
    pub fines: Vec<Fine>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the member's fines.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<FinesTemplate, AppError> {
    let fines = state.library().fines(&auth.access_token).await?;

    Ok(FinesTemplate {
        fines,
        error: query.error,
        success: query.success,
    })
}

/// Flash for a payment attempt. A missing order id means the payment
/// provider rejected the order.
fn payment_flash(order: PaymentOrder) -> Redirect {
    match order.order_id {
        Some(order_id) => flash_success(
            "/fines",
            &format!("Payment initiated. Order ID: {order_id}"),
        ),
        None => flash_error("/fines", "Payment failed!"),
    }
}

/// Start a payment for a fine, then land back on the fines page.
#[instrument(skip(state, auth, form))]
pub async fn pay(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(fine_id): Path<FineId>,
    Form(form): Form<PayForm>,
) -> Result<Redirect, AppError> {
    let request = CreatePaymentRequest {
        amount: form.amount,
    };

    match state
        .library()
        .create_payment(&auth.access_token, &request)
        .await
    {
        Ok(order) => Ok(payment_flash(order)),
        Err(LibraryError::Forbidden(message) | LibraryError::Backend(message)) => {
            Ok(flash_error("/fines", &message))
        }
        Err(e) => Err(AppError::Library(e)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::header::LOCATION;
    use axum::response::IntoResponse;
    use shelfside_core::types::Money;

    use super::*;

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

    #[test]
    fn test_payment_flash_reports_order_id() {
        let redirect = payment_flash(PaymentOrder {
            order_id: Some("order_123".to_string()),
            amount: Some(Money::new(Decimal::new(45, 0))),
        });

        let location = location(redirect);
        assert!(location.starts_with("/fines?success="));
        assert!(location.contains("order_123"));
    }

    #[test]
    fn test_payment_flash_without_order_is_an_error() {
        let redirect = payment_flash(PaymentOrder {
            order_id: None,
            amount: None,
        });

        assert_eq!(location(redirect), "/fines?error=Payment%20failed%21");
    }
}
