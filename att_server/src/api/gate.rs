//! Access gate for protected endpoints.
//!
//! Every protected handler goes through the gate before touching its own
//! logic: session validation first, then role membership, then (for
//! mutating requests) CSRF. A role denial writes exactly one
//! `unauthorized_access` audit row.

use attendance::{Action, ActivityAuditor, AuthError, AuthResult, Identity, Role, SessionManager};
use axum::http::HeaderMap;
use std::sync::Arc;

use super::cookies;

/// Authentication and authorization checks shared by protected routes.
#[derive(Clone)]
pub struct AccessGate {
    sessions: Arc<SessionManager>,
    auditor: Arc<ActivityAuditor>,
}

impl AccessGate {
    pub fn new(sessions: Arc<SessionManager>, auditor: Arc<ActivityAuditor>) -> Self {
        Self { sessions, auditor }
    }

    /// Validate the request's session cookie and return the caller's
    /// identity. Sliding-window refresh happens here.
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        let session_id = cookies::session_id(headers).ok_or(AuthError::Unauthenticated)?;
        self.sessions.validate(&session_id)
    }

    /// Authenticate, then require the caller's role to be in `allowed`.
    ///
    /// A mismatch is audited as `unauthorized_access` naming both the
    /// caller's role and the required set, then denied.
    pub async fn require_role(
        &self,
        headers: &HeaderMap,
        allowed: &[Role],
    ) -> AuthResult<Identity> {
        let identity = self.authenticate(headers)?;

        if !allowed.contains(&identity.role) {
            let required = allowed
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(",");
            let meta = cookies::request_meta(headers);
            self.auditor
                .log(
                    identity.user_id,
                    Action::UnauthorizedAccess,
                    &format!(
                        "Attempted to access role-restricted content. User role: {}, Required: {}",
                        identity.role, required
                    ),
                    &meta,
                )
                .await;
            crate::logging::log_security_event(
                "unauthorized_access",
                Some(identity.user_id),
                Some(&meta.ip_address),
                "Role check failed",
            );
            return Err(AuthError::Forbidden);
        }

        Ok(identity)
    }

    /// Require a CSRF token bound to the request's session. Comparison is
    /// constant time inside the session store.
    pub fn require_csrf(&self, headers: &HeaderMap) -> AuthResult<()> {
        let session_id = cookies::session_id(headers).ok_or(AuthError::Unauthenticated)?;
        let presented = headers
            .get(cookies::CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if presented.is_empty() || !self.sessions.verify_csrf(&session_id, presented) {
            return Err(AuthError::CsrfMismatch);
        }
        Ok(())
    }
}
