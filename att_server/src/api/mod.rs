//! HTTP API for the attendance server.
//!
//! # Endpoints
//!
//! ## Authentication (no session required)
//! - `POST /api/auth/login` - Login with email/password, sets session cookie
//! - `POST /api/auth/signup` - Register a new account
//!
//! ## Session
//! - `GET /api/auth/logout` - Destroy the session, clear the cookie
//! - `GET /api/auth/check` - Return the caller's identity claims
//!
//! ## Role-protected
//! - `GET /api/student/profile` - Student profile (students only)
//! - `POST /api/student/profile` - Update student profile (students only, CSRF)
//! - `GET /api/faculty/profile` - Faculty profile (faculty only)
//! - `GET /api/intern/profile` - Intern profile (interns only)
//!
//! ## Health
//! - `GET /health` - Server health status
//!
//! Every response body uses the [`envelope::ApiResponse`] shape. CORS is
//! configured permissively for development.

pub mod auth;
pub mod cookies;
pub mod envelope;
pub mod gate;
pub mod profiles;
pub mod request_id;

use attendance::{
    ActivityAuditor, CredentialStore, RegistrationCoordinator, SessionManager,
    db::UserRepository,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use gate::AccessGate;

/// Application state shared across all handlers. Cloned per request; every
/// field is an `Arc`, so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub credentials: Arc<CredentialStore>,
    pub registrar: Arc<RegistrationCoordinator>,
    pub auditor: Arc<ActivityAuditor>,
    pub users: Arc<dyn UserRepository>,
    pub gate: Arc<AccessGate>,
    pub pool: Arc<PgPool>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", get(auth::logout))
        .route("/api/auth/check", get(auth::check_auth))
        .route("/api/auth/signup", post(auth::signup))
        .route(
            "/api/student/profile",
            get(profiles::student_profile).post(profiles::update_student_profile),
        )
        .route("/api/faculty/profile", get(profiles::faculty_profile))
        .route("/api/intern/profile", get(profiles::intern_profile))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database responds, `503` otherwise, with the
/// live session count included.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "active_sessions": state.sessions.active_count(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
