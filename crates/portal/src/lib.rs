//! Shelfside Portal library.
//!
//! This crate provides the portal as a library, allowing the whole HTTP
//! surface to be driven in-process by the integration tests. [`app`] builds
//! the complete router; the binary only adds Sentry's tower layers and a
//! listener on top.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod library;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::state::AppState;

/// Build the portal application.
///
/// Layer order, outermost first: request tracing, request id propagation,
/// sessions, security headers, then the routes. Health endpoints sit under
/// the same layers so probes show up in the request log.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                status = tracing::field::Empty,
                latency_ms = tracing::field::Empty,
                request_id = tracing::field::Empty,
            )
        })
        .on_response(|response: &Response, latency: Duration, span: &Span| {
            span.record("status", response.status().as_u16());
            span.record(
                "latency_ms",
                u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            );
        });

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(session_layer)
                .layer(axum::middleware::from_fn(
                    middleware::security_headers_middleware,
                )),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the library backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.library().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
