//! Response envelope shared by every endpoint.
//!
//! Every response body, success or failure, is `{"success": bool}` plus an
//! optional `message` and optional `data`. Clients branch on `success` and
//! the HTTP status, never on message text.

use attendance::AuthError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Uniform JSON body for all endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Success with a message and no payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Success with a message and a payload.
    pub fn with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A failed request: status code plus the client-facing message, rendered
/// as a `success: false` envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            success: false,
            message: Some(self.message),
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        // Internal failures get full detail in the server log and a
        // generic message on the wire.
        if err.is_internal() {
            tracing::error!(error = %err, "internal error while handling request");
        }

        let status = match &err {
            AuthError::Database(_) | AuthError::HashingFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden | AuthError::CsrfMismatch => StatusCode::FORBIDDEN,
            AuthError::EmailConflict | AuthError::UserIdConflict => StatusCode::CONFLICT,
            AuthError::MissingField(_)
            | AuthError::InvalidEmail
            | AuthError::InvalidDate
            | AuthError::Underage
            | AuthError::InvalidUserId
            | AuthError::InvalidRole
            | AuthError::WeakPassword
            | AuthError::MissingRoleFields(_) => StatusCode::BAD_REQUEST,
        };

        Self {
            status,
            message: err.client_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_absent_fields() {
        let body = serde_json::to_value(ApiResponse::ok("Login successful")).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Login successful");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn data_envelope_carries_payload() {
        let body = serde_json::to_value(ApiResponse::with_data(
            "ok",
            serde_json::json!({"role": "student"}),
        ))
        .unwrap();
        assert_eq!(body["data"]["role"], "student");
    }

    #[test]
    fn auth_errors_map_to_expected_statuses() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AuthError::SessionExpired, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (AuthError::CsrfMismatch, StatusCode::FORBIDDEN),
            (AuthError::EmailConflict, StatusCode::CONFLICT),
            (AuthError::UserIdConflict, StatusCode::CONFLICT),
            (AuthError::WeakPassword, StatusCode::BAD_REQUEST),
            (AuthError::MissingField("email"), StatusCode::BAD_REQUEST),
            (AuthError::HashingFailed, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status, expected);
        }
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let api_err = ApiError::from(AuthError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.message, "Database error occurred");
    }
}
