//! Role-protected profile endpoints.
//!
//! Each handler clears the access gate for its role before touching the
//! repository, so an intern probing the faculty endpoint is denied (and
//! audited) without any profile data being read.

use attendance::Role;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;

use super::AppState;
use super::envelope::{ApiError, ApiResponse};

/// Student profile view.
pub async fn student_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse, ApiError> {
    let identity = state.gate.require_role(&headers, &[Role::Student]).await?;

    let record = state
        .users
        .student_profile(identity.user_id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Profile not found"))?;

    let data = serde_json::to_value(&record)
        .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed"))?;
    Ok(ApiResponse::with_data("Profile retrieved", data))
}

#[derive(Debug, Deserialize)]
pub struct StudentProfileUpdate {
    pub major_id: i64,
    pub year_of_study: i32,
}

/// Update the mutable fields of a student profile. Mutating, so the CSRF
/// token is required on top of the role check.
pub async fn update_student_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<StudentProfileUpdate>,
) -> Result<ApiResponse, ApiError> {
    let identity = state.gate.require_role(&headers, &[Role::Student]).await?;
    state.gate.require_csrf(&headers)?;

    if payload.major_id < 1 || payload.year_of_study < 1 {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Major and year of study must be positive numbers",
        ));
    }

    state
        .users
        .update_student_profile(identity.user_id, payload.major_id, payload.year_of_study)
        .await?;

    Ok(ApiResponse::ok("Profile updated successfully"))
}

/// Faculty profile view.
pub async fn faculty_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse, ApiError> {
    let identity = state.gate.require_role(&headers, &[Role::Faculty]).await?;

    let record = state
        .users
        .faculty_profile(identity.user_id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Profile not found"))?;

    let data = serde_json::to_value(&record)
        .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed"))?;
    Ok(ApiResponse::with_data("Profile retrieved", data))
}

/// Intern profile view.
pub async fn intern_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiResponse, ApiError> {
    let identity = state.gate.require_role(&headers, &[Role::Intern]).await?;

    let record = state
        .users
        .intern_profile(identity.user_id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Profile not found"))?;

    let data = serde_json::to_value(&record)
        .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed"))?;
    Ok(ApiResponse::with_data("Profile retrieved", data))
}
