//! # Attendance
//!
//! Core library for the attendance-tracking platform: credential
//! verification, server-side session lifecycle, role-aware registration,
//! and best-effort activity auditing.
//!
//! The HTTP surface lives in the `att_server` crate. This library owns the
//! contract every protected endpoint consumes: who the caller is, what
//! role they hold, and the state needed to decide whether the request is
//! allowed.
//!
//! ## Core Modules
//!
//! - [`auth`]: credential store, session manager, registration coordinator
//! - [`audit`]: append-only activity log whose write failures never
//!   propagate
//! - [`db`]: PostgreSQL pool, configuration, and the user repository

/// Authentication: credentials, sessions, and registration.
pub mod auth;
pub use auth::{
    AuthError, AuthResult, CredentialStore, Identity, RegistrationCoordinator, Role,
    SessionManager, SignupRequest,
};

/// Append-only security event log.
pub mod audit;
pub use audit::{Action, ActivityAuditor, RequestMeta};

/// Database pool and repositories.
pub mod db;
pub use db::{Database, DatabaseConfig};
