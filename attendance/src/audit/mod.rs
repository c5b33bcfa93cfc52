//! Best-effort activity audit trail.
//!
//! Security-relevant events are appended to the `activity_logs` table with
//! the acting user, the action, a human-readable detail line, and request
//! context. Audit writes never fail their caller: a broken audit insert is
//! logged and swallowed so a logging outage cannot lock users out.

use sqlx::PgPool;
use std::fmt;
use std::sync::Arc;

/// The closed set of audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoginSuccess,
    LoginFailed,
    Logout,
    Registration,
    UnauthorizedAccess,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::LoginSuccess => "login_success",
            Action::LoginFailed => "login_failed",
            Action::Logout => "logout",
            Action::Registration => "registration",
            Action::UnauthorizedAccess => "unauthorized_access",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request context recorded alongside every audit row.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Client address, from `x-forwarded-for` when present, otherwise the
    /// peer address, otherwise `"unknown"`.
    pub ip_address: String,
    pub user_agent: String,
}

impl RequestMeta {
    pub fn unknown() -> Self {
        Self {
            ip_address: "unknown".to_string(),
            user_agent: "unknown".to_string(),
        }
    }
}

/// Appends audit rows. Cheap to clone and share across handlers.
#[derive(Clone)]
pub struct ActivityAuditor {
    pool: Arc<PgPool>,
}

impl ActivityAuditor {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Record one audit event. Best-effort: an insert failure is warned
    /// about and otherwise ignored.
    pub async fn log(&self, user_id: i64, action: Action, details: &str, meta: &RequestMeta) {
        let result = sqlx::query(
            r#"
            INSERT INTO activity_logs (user_id, action, details, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(action.as_str())
        .bind(details)
        .bind(&meta.ip_address)
        .bind(&meta.user_agent)
        .execute(self.pool.as_ref())
        .await;

        if let Err(error) = result {
            log::warn!("audit write failed for {action} (user {user_id}): {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_have_stable_wire_names() {
        assert_eq!(Action::LoginSuccess.as_str(), "login_success");
        assert_eq!(Action::LoginFailed.as_str(), "login_failed");
        assert_eq!(Action::Logout.as_str(), "logout");
        assert_eq!(Action::Registration.as_str(), "registration");
        assert_eq!(Action::UnauthorizedAccess.as_str(), "unauthorized_access");
    }

    #[test]
    fn unknown_meta_placeholder() {
        let meta = RequestMeta::unknown();
        assert_eq!(meta.ip_address, "unknown");
        assert_eq!(meta.user_agent, "unknown");
    }
}
