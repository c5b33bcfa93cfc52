//! Authentication error types.

use thiserror::Error;

/// Authentication and registration errors.
///
/// Display strings are the client-facing messages; anything sensitive
/// (storage detail, hash internals) stays out of them by construction.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error occurred")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Bad credentials; intentionally generic so account existence is not
    /// confirmed either way
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No valid session accompanies the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Session exceeded the inactivity window and was destroyed
    #[error("Session expired. Please login again.")]
    SessionExpired,

    /// Authenticated but the role is not in the allowed set
    #[error("Access denied. Insufficient permissions.")]
    Forbidden,

    /// Missing or mismatched CSRF token on a mutating request
    #[error("Invalid or missing CSRF token")]
    CsrfMismatch,

    /// A required signup field was absent or empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Email failed the syntax check
    #[error("Invalid email format")]
    InvalidEmail,

    /// A date field was not a real YYYY-MM-DD calendar date
    #[error("Invalid date format")]
    InvalidDate,

    /// Date of birth implies age under 16
    #[error("You must be at least 16 years old")]
    Underage,

    /// User ID was not a positive integer
    #[error("User ID must be a positive number")]
    InvalidUserId,

    /// Role outside {student, faculty, intern}
    #[error("Invalid role")]
    InvalidRole,

    /// Password strength score below 3
    #[error(
        "Password is too weak. Please include uppercase, lowercase, numbers, and special characters."
    )]
    WeakPassword,

    /// Role-specific fields missing for the selected role
    #[error("{0}")]
    MissingRoleFields(String),

    /// Email already registered
    #[error("Email already registered")]
    EmailConflict,

    /// User ID already registered
    #[error("User ID already exists")]
    UserIdConflict,
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive
    /// information.
    ///
    /// Storage errors carry their detail in the error source, which goes to
    /// the server-side log only.
    pub fn client_message(&self) -> String {
        self.to_string()
    }

    /// Whether this error is an internal failure (storage, hashing) rather
    /// than something the caller did wrong.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Database(_) | AuthError::HashingFailed)
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_message_is_generic() {
        let err = AuthError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.client_message(), "Database error occurred");
        assert!(err.is_internal());
    }

    #[test]
    fn credential_error_does_not_mention_account_existence() {
        let err = AuthError::InvalidCredentials;
        assert_eq!(err.client_message(), "Invalid email or password");
        assert!(!err.is_internal());
    }
}
