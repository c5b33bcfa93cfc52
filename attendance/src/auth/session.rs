//! Server-side session store and lifecycle management.
//!
//! Sessions live in process memory, keyed by an unguessable session id
//! carried in a cookie. A session moves `Anonymous -> Authenticated ->
//! (Expired | LoggedOut)`: [`SessionManager::create`] issues a brand-new id
//! at every login (session-fixation defense), [`SessionManager::validate`]
//! applies a sliding eight-hour inactivity window and refreshes it on every
//! successful use, and [`SessionManager::destroy`] is idempotent.

use chrono::{Duration, Utc};
use parking_lot::Mutex;
use rand::RngCore;
use std::collections::HashMap;
use subtle::ConstantTimeEq;

use super::errors::{AuthError, AuthResult};
use super::models::{Identity, Session, UserAccount};

/// Absolute-since-last-activity session window, in hours.
pub const SESSION_TTL_HOURS: i64 = 8;

/// Bytes of entropy behind session ids and CSRF tokens.
const TOKEN_BYTES: usize = 32;

/// Generate an unguessable token: 32 random bytes, hex-encoded.
fn random_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// In-memory session store.
///
/// Injected into the server state so tests can substitute their own
/// instance; nothing reads session state from globals.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(SESSION_TTL_HOURS))
    }

    /// Build a store with a custom inactivity window.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Establish a session for a verified login.
    ///
    /// A fresh session id is issued every time so a pre-login id handed to
    /// the victim can never become authenticated. Returns the session id
    /// and the CSRF token bound to it.
    pub fn create(&self, account: &UserAccount) -> (String, String) {
        let session_id = random_token();
        let csrf_token = random_token();

        let session = Session {
            user_id: account.user_id,
            username: account.username(),
            email: account.email.clone(),
            role: account.role,
            login_time: Utc::now(),
            csrf_token: csrf_token.clone(),
            logged_in: true,
        };

        self.sessions.lock().insert(session_id.clone(), session);
        (session_id, csrf_token)
    }

    /// Validate a session and return its identity claims.
    ///
    /// Fails `Unauthenticated` when the id is unknown or the logged-in
    /// claim is absent. A session idle longer than the window transitions
    /// to Expired, is removed, and fails `SessionExpired`. Otherwise the
    /// window slides: `login_time` is refreshed to now.
    pub fn validate(&self, session_id: &str) -> AuthResult<Identity> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock();

        let Some(session) = sessions.get_mut(session_id) else {
            return Err(AuthError::Unauthenticated);
        };
        if !session.logged_in {
            return Err(AuthError::Unauthenticated);
        }
        if now - session.login_time > self.ttl {
            sessions.remove(session_id);
            return Err(AuthError::SessionExpired);
        }

        session.login_time = now;
        Ok(Identity {
            user_id: session.user_id,
            username: session.username.clone(),
            email: session.email.clone(),
            role: session.role,
        })
    }

    /// Read identity claims without sliding the window or expiring the
    /// session. Used for audit context during logout.
    pub fn peek(&self, session_id: &str) -> Option<Identity> {
        let sessions = self.sessions.lock();
        let session = sessions.get(session_id).filter(|s| s.logged_in)?;
        Some(Identity {
            user_id: session.user_id,
            username: session.username.clone(),
            email: session.email.clone(),
            role: session.role,
        })
    }

    /// Terminate server-side session state. Idempotent: destroying an
    /// unknown or already-destroyed id is a no-op.
    pub fn destroy(&self, session_id: &str) {
        self.sessions.lock().remove(session_id);
    }

    /// Constant-time comparison of a presented CSRF token against the one
    /// bound to the session.
    pub fn verify_csrf(&self, session_id: &str, presented: &str) -> bool {
        let sessions = self.sessions.lock();
        let Some(session) = sessions.get(session_id) else {
            return false;
        };
        session
            .csrf_token
            .as_bytes()
            .ct_eq(presented.as_bytes())
            .into()
    }

    /// Number of live sessions. Exposed for the health endpoint.
    pub fn active_count(&self) -> usize {
        self.sessions.lock().len()
    }

    #[cfg(test)]
    fn backdate(&self, session_id: &str, by: Duration) {
        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get_mut(session_id) {
            session.login_time -= by;
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    fn account() -> UserAccount {
        UserAccount {
            user_id: 42,
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.edu".to_string(),
            password_hash: String::new(),
            role: Role::Faculty,
        }
    }

    #[test]
    fn create_then_validate_returns_claims() {
        let manager = SessionManager::new();
        let (sid, _) = manager.create(&account());

        let identity = manager.validate(&sid).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.username, "Grace Hopper");
        assert_eq!(identity.role, Role::Faculty);
    }

    #[test]
    fn every_login_issues_a_fresh_session_id() {
        let manager = SessionManager::new();
        let (a, csrf_a) = manager.create(&account());
        let (b, csrf_b) = manager.create(&account());
        assert_ne!(a, b);
        assert_ne!(csrf_a, csrf_b);
        // Concurrent logins are independent; both stay valid.
        assert!(manager.validate(&a).is_ok());
        assert!(manager.validate(&b).is_ok());
    }

    #[test]
    fn unknown_session_is_unauthenticated() {
        let manager = SessionManager::new();
        assert!(matches!(
            manager.validate("deadbeef"),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn session_survives_just_under_the_window() {
        let manager = SessionManager::new();
        let (sid, _) = manager.create(&account());

        manager.backdate(&sid, Duration::hours(7) + Duration::minutes(59));
        assert!(manager.validate(&sid).is_ok());
    }

    #[test]
    fn validation_slides_the_window() {
        let manager = SessionManager::new();
        let (sid, _) = manager.create(&account());

        // Idle almost to the limit, touch once, then idle almost to the
        // limit again: still valid, because each validation refreshes.
        manager.backdate(&sid, Duration::hours(7) + Duration::minutes(59));
        manager.validate(&sid).unwrap();
        manager.backdate(&sid, Duration::hours(7) + Duration::minutes(59));
        assert!(manager.validate(&sid).is_ok());
    }

    #[test]
    fn idle_past_the_window_expires_and_destroys() {
        let manager = SessionManager::new();
        let (sid, _) = manager.create(&account());

        manager.backdate(&sid, Duration::hours(8) + Duration::minutes(1));
        assert!(matches!(
            manager.validate(&sid),
            Err(AuthError::SessionExpired)
        ));
        // The session was destroyed, not left expired: a retry is now
        // plain unauthenticated.
        assert!(matches!(
            manager.validate(&sid),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn destroy_is_idempotent() {
        let manager = SessionManager::new();
        let (sid, _) = manager.create(&account());

        manager.destroy(&sid);
        manager.destroy(&sid);
        manager.destroy("never-existed");
        assert!(matches!(
            manager.validate(&sid),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn peek_does_not_slide_the_window() {
        let manager = SessionManager::new();
        let (sid, _) = manager.create(&account());

        manager.backdate(&sid, Duration::hours(8) + Duration::minutes(1));
        // peek still sees the stale session...
        assert!(manager.peek(&sid).is_some());
        // ...and validate then expires it as usual.
        assert!(matches!(
            manager.validate(&sid),
            Err(AuthError::SessionExpired)
        ));
    }

    #[test]
    fn active_count_tracks_create_and_destroy() {
        let manager = SessionManager::new();
        assert_eq!(manager.active_count(), 0);

        let (sid, _) = manager.create(&account());
        manager.create(&account());
        assert_eq!(manager.active_count(), 2);

        manager.destroy(&sid);
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn csrf_token_is_bound_to_its_session() {
        let manager = SessionManager::new();
        let (sid, csrf) = manager.create(&account());

        assert!(manager.verify_csrf(&sid, &csrf));
        assert!(!manager.verify_csrf(&sid, "forged-token"));
        assert!(!manager.verify_csrf(&sid, ""));
        assert!(!manager.verify_csrf("other-session", &csrf));
    }

    #[test]
    fn tokens_are_hex_of_32_bytes() {
        let token = random_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
