//! Integration tests for Shelfside.
//!
//! Every test drives the real portal router in-process against a stub
//! library backend. Both are bound to ephemeral ports, so the suite needs
//! no running services, no credentials, and no network beyond loopback:
//!
//! ```bash
//! cargo test -p shelfside-integration-tests
//! ```
//!
//! The stub backend serves canned JSON shaped like the real library API
//! and counts every request it receives, which is what lets tests assert
//! not just on rendered pages but on how many backend calls a page view
//! or an action actually costs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use url::Url;

use shelfside_portal::config::{LibraryApiConfig, PortalConfig};
use shelfside_portal::state::AppState;

// =============================================================================
// Canned Accounts
// =============================================================================

pub const STUDENT_EMAIL: &str = "asha@example.com";
pub const ADMIN_EMAIL: &str = "marcus@example.com";
pub const PASSWORD: &str = "secret";
pub const TAKEN_EMAIL: &str = "taken@example.com";

const STUDENT_TOKEN: &str = "test-token-student";
const ADMIN_TOKEN: &str = "test-token-admin";

// =============================================================================
// Backend Instrumentation
// =============================================================================

/// Request counts per stub endpoint.
///
/// Endpoint labels: `login`, `signup`, `profile`, `profile_edit`, `books`,
/// `borrow`, `borrowed`, `return`, `fines`, `create_payment`,
/// `reservations`, `reserve`, `cancel`, `notifications`, `reports`, `root`.
#[derive(Debug, Default)]
pub struct BackendHits {
    counts: Mutex<HashMap<&'static str, usize>>,
}

impl BackendHits {
    fn record(&self, endpoint: &'static str) {
        let mut counts = self.counts.lock().expect("hit counter lock poisoned");
        *counts.entry(endpoint).or_insert(0) += 1;
    }

    /// How many times one endpoint was hit.
    pub fn count(&self, endpoint: &str) -> usize {
        let counts = self.counts.lock().expect("hit counter lock poisoned");
        counts.get(endpoint).copied().unwrap_or(0)
    }

    /// Total requests the stub backend received, across all endpoints.
    pub fn total(&self) -> usize {
        let counts = self.counts.lock().expect("hit counter lock poisoned");
        counts.values().sum()
    }
}

/// Request bodies captured by the stub, for asserting what the portal sent.
#[derive(Debug, Default)]
pub struct CapturedBodies {
    payment: Mutex<Option<Value>>,
    profile_edit: Mutex<Option<Value>>,
}

impl CapturedBodies {
    /// The JSON body of the most recent create-payment call.
    pub fn last_payment(&self) -> Option<Value> {
        self.payment.lock().expect("capture lock poisoned").clone()
    }

    /// The JSON body of the most recent profile edit call.
    pub fn last_profile_edit(&self) -> Option<Value> {
        self.profile_edit
            .lock()
            .expect("capture lock poisoned")
            .clone()
    }
}

#[derive(Clone)]
struct StubState {
    hits: Arc<BackendHits>,
    bodies: Arc<CapturedBodies>,
}

// =============================================================================
// Stub Backend
// =============================================================================

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn token_missing() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token is missing"}))).into_response()
}

/// Resolve the caller's role, or reply 401.
fn role_for(headers: &HeaderMap) -> Result<&'static str, Response> {
    match bearer(headers) {
        Some(STUDENT_TOKEN) => Ok("user"),
        Some(ADMIN_TOKEN) => Ok("admin"),
        _ => Err(token_missing()),
    }
}

async fn stub_root(State(state): State<StubState>) -> &'static str {
    state.hits.record("root");
    "Library backend up"
}

async fn stub_login(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.hits.record("login");
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match (email, password) {
        (STUDENT_EMAIL, PASSWORD) => {
            Json(json!({"access_token": STUDENT_TOKEN, "role": "user"})).into_response()
        }
        (ADMIN_EMAIL, PASSWORD) => {
            Json(json!({"access_token": ADMIN_TOKEN, "role": "admin"})).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        )
            .into_response(),
    }
}

async fn stub_signup(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.hits.record("signup");
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();

    if email == TAKEN_EMAIL {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Email already registered"})),
        )
            .into_response()
    } else {
        (
            StatusCode::CREATED,
            Json(json!({"message": "User created successfully"})),
        )
            .into_response()
    }
}

async fn stub_profile(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.hits.record("profile");
    match role_for(&headers) {
        Ok("admin") => Json(json!({
            "id": 2,
            "name": "Marcus Webb",
            "email": ADMIN_EMAIL,
            "role": "admin",
        }))
        .into_response(),
        Ok(_) => Json(json!({
            "id": 1,
            "name": "Asha Rao",
            "email": STUDENT_EMAIL,
            "role": "user",
        }))
        .into_response(),
        Err(response) => response,
    }
}

async fn stub_profile_edit(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hits.record("profile_edit");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    *state
        .bodies
        .profile_edit
        .lock()
        .expect("capture lock poisoned") = Some(body);
    Json(json!({"message": "Profile updated successfully"})).into_response()
}

async fn stub_books(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.hits.record("books");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    Json(json!([
        {
            "id": 1,
            "title": "The Rust Programming Language",
            "author": "Steve Klabnik",
            "isbn": "978-1593278281",
            "copies_available": 2,
        },
        {
            "id": 2,
            "title": "Dune",
            "author": "Frank Herbert",
            "isbn": "978-0441013593",
            "copies_available": 0,
        },
        {
            "id": 3,
            "title": "Clean Code",
            "author": "Robert Martin",
            "isbn": "978-0132350884",
            "copies_available": 1,
        },
    ]))
    .into_response()
}

async fn stub_borrow(
    State(state): State<StubState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.hits.record("borrow");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    match id {
        1 => Json(json!({"message": "Book borrowed successfully"})).into_response(),
        3 => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "You have unpaid fines. Clear them to borrow books."})),
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Book not found"})),
        )
            .into_response(),
    }
}

async fn stub_borrowed(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.hits.record("borrowed");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    // One loan long overdue, one due far in the future.
    Json(json!([
        {
            "id": 1,
            "title": "The Rust Programming Language",
            "due_date": "2020-01-01",
            "fine_due": 45.5,
        },
        {
            "id": 4,
            "title": "The Pragmatic Programmer",
            "due_date": "2099-01-01",
            "fine_due": null,
        },
    ]))
    .into_response()
}

async fn stub_return(
    State(state): State<StubState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.hits.record("return");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    if id == 1 {
        Json(json!({"message": "Book returned successfully"})).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No active borrow record found"})),
        )
            .into_response()
    }
}

async fn stub_fines(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.hits.record("fines");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    Json(json!([
        {"id": 1, "amount": 45.5, "payment_status": "pending"},
        {"id": 2, "amount": 10.0, "payment_status": "completed"},
    ]))
    .into_response()
}

async fn stub_create_payment(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hits.record("create_payment");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    let amount = body.get("amount").cloned().unwrap_or(Value::Null);
    *state.bodies.payment.lock().expect("capture lock poisoned") = Some(body);
    Json(json!({"order_id": "order_test_1", "amount": amount})).into_response()
}

async fn stub_reservations(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.hits.record("reservations");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    Json(json!([
        {
            "id": 1,
            "book_title": "Dune",
            "reserved_at": "2026-03-08T14:30:00Z",
            "status": "pending",
        },
    ]))
    .into_response()
}

async fn stub_reserve(
    State(state): State<StubState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.hits.record("reserve");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    if id == 2 {
        Json(json!({"message": "Book reserved successfully"})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Copies are available, borrow instead"})),
        )
            .into_response()
    }
}

async fn stub_cancel(
    State(state): State<StubState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.hits.record("cancel");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    if id == 1 {
        Json(json!({"message": "Reservation cancelled successfully"})).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No active reservation found"})),
        )
            .into_response()
    }
}

async fn stub_notifications(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.hits.record("notifications");
    if let Err(response) = role_for(&headers) {
        return response;
    }

    Json(json!([
        {
            "message": "The Rust Programming Language is due soon",
            "notification_type": "due_date",
            "sent_at": "2026-03-07T09:00:00Z",
        },
    ]))
    .into_response()
}

async fn stub_reports(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.hits.record("reports");
    match role_for(&headers) {
        Ok("admin") => Json(json!({
            "total_books": 120,
            "total_students": 48,
            "borrowed_books": 23,
        }))
        .into_response(),
        Ok(_) => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Admins only"})),
        )
            .into_response(),
        Err(response) => response,
    }
}

fn stub_backend(state: StubState) -> Router {
    Router::new()
        .route("/", get(stub_root))
        .route("/auth/login", post(stub_login))
        .route("/auth/signup", post(stub_signup))
        .route("/auth/profile", get(stub_profile))
        .route("/auth/profile/edit", put(stub_profile_edit))
        .route("/books/", get(stub_books))
        .route("/books/borrow/{id}", post(stub_borrow))
        .route("/students/books/borrowed", get(stub_borrowed))
        .route("/students/books/return/{id}", post(stub_return))
        .route("/payments/view", get(stub_fines))
        .route("/payments/create-payment", post(stub_create_payment))
        .route("/reservations/view", get(stub_reservations))
        .route("/reservations/reserve/{id}", post(stub_reserve))
        .route("/reservations/cancel/{id}", delete(stub_cancel))
        .route("/notifications/view", get(stub_notifications))
        .route("/admin/reports", get(stub_reports))
        .with_state(state)
}

// =============================================================================
// Test Context
// =============================================================================

/// A portal instance wired to a fresh stub backend, plus a cookie-holding
/// HTTP client. Each test builds its own context, so hit counts never bleed
/// between tests.
pub struct TestContext {
    pub client: reqwest::Client,
    pub portal_url: String,
    pub hits: Arc<BackendHits>,
    pub bodies: Arc<CapturedBodies>,
}

impl TestContext {
    /// Spawn the stub backend and the portal on ephemeral ports.
    pub async fn new() -> Self {
        let hits = Arc::new(BackendHits::default());
        let bodies = Arc::new(CapturedBodies::default());
        let backend_addr = spawn(stub_backend(StubState {
            hits: hits.clone(),
            bodies: bodies.clone(),
        }))
        .await;

        let config = PortalConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1:0".to_string(),
            library: LibraryApiConfig {
                base_url: Url::parse(&format!("http://{backend_addr}"))
                    .expect("stub backend URL should parse"),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config).expect("portal state should build");
        let portal_addr = spawn(shelfside_portal::app(state)).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            portal_url: format!("http://{portal_addr}"),
            hits,
            bodies,
        }
    }

    /// Full portal URL for a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.portal_url)
    }

    /// Log in through the real login form and follow the redirect.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("login request should reach the portal")
    }

    /// Log in as the canned student account.
    pub async fn login_as_student(&self) -> reqwest::Response {
        self.login(STUDENT_EMAIL, PASSWORD).await
    }

    /// Log in as the canned admin account.
    pub async fn login_as_admin(&self) -> reqwest::Response {
        self.login(ADMIN_EMAIL, PASSWORD).await
    }
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port should bind");
    let addr = listener.local_addr().expect("listener has a local address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("test server crashed");
    });

    addr
}
