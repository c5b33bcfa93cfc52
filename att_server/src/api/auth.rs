//! Authentication API handlers: login, logout, session check, and signup.
//!
//! Login establishes a server-side session and hands the browser an
//! HttpOnly session cookie plus a CSRF token in the response body. Logout
//! and the failure paths below deliberately mirror each other's shapes so
//! responses do not reveal whether an account exists.

use attendance::{Action, SignupRequest, auth::validate};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use super::cookies;
use super::envelope::{ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Authenticate with email and password.
///
/// On success, sets the session cookie and returns the caller's claims
/// plus the CSRF token for mutating requests. Unknown email and wrong
/// password produce the identical 401 response.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Email and password are required",
        ));
    }

    let meta = cookies::request_meta(&headers);
    let email = validate::sanitize(&payload.email);

    let Some(account) = state.users.find_by_email(&email).await? else {
        // No audit row: there is no account to attribute the attempt to.
        crate::logging::log_security_event(
            "failed_login",
            None,
            Some(&meta.ip_address),
            "Login attempt for unknown email",
        );
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    };

    if !state
        .credentials
        .verify(&payload.password, &account.password_hash)
    {
        state
            .auditor
            .log(account.user_id, Action::LoginFailed, "Invalid password", &meta)
            .await;
        crate::logging::log_security_event(
            "failed_login",
            Some(account.user_id),
            Some(&meta.ip_address),
            "Invalid password attempt",
        );
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        ));
    }

    let (session_id, csrf_token) = state.sessions.create(&account);

    state
        .auditor
        .log(
            account.user_id,
            Action::LoginSuccess,
            "User logged in successfully",
            &meta,
        )
        .await;

    let body = ApiResponse::with_data(
        "Login successful",
        json!({
            "user_id": account.user_id,
            "username": account.username(),
            "role": account.role,
            "csrf_token": csrf_token,
        }),
    );

    Ok((
        AppendHeaders([(SET_COOKIE, cookies::build_session_cookie(&session_id))]),
        body,
    ))
}

/// Destroy the caller's session and clear the cookie.
///
/// Always succeeds, with or without a live session, so a stale client can
/// safely retry.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let meta = cookies::request_meta(&headers);

    if let Some(session_id) = cookies::session_id(&headers) {
        if let Some(identity) = state.sessions.peek(&session_id) {
            state
                .auditor
                .log(identity.user_id, Action::Logout, "User logged out", &meta)
                .await;
        }
        state.sessions.destroy(&session_id);
    }

    (
        AppendHeaders([(SET_COOKIE, cookies::clear_session_cookie())]),
        ApiResponse::ok("Logout successful"),
    )
}

/// Report whether the caller holds a valid session, returning the identity
/// claims when they do. Validation slides the inactivity window.
pub async fn check_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse, ApiError> {
    let identity = state.gate.authenticate(&headers)?;
    let claims = serde_json::to_value(&identity)
        .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed"))?;
    Ok(ApiResponse::with_data("Authenticated", claims))
}

/// Register a new account.
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SignupRequest>,
) -> Result<ApiResponse, ApiError> {
    let meta = cookies::request_meta(&headers);
    let registered = state.registrar.register(payload, &meta).await?;

    Ok(ApiResponse::with_data(
        "Registration successful",
        json!({
            "user_id": registered.user_id,
            "email": registered.email,
            "role": registered.role,
        }),
    ))
}
