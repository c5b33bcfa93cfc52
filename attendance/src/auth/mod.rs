//! Authentication and authorization primitives.
//!
//! This module owns credential hashing and verification, server-side
//! session state, and the all-or-nothing registration flow. The pieces are
//! deliberately independent: a login composes [`CredentialStore`] and
//! [`SessionManager`]; signup flows entirely through
//! [`RegistrationCoordinator`]; protected requests validate through
//! [`SessionManager`] before any handler logic runs.

pub mod credentials;
pub mod errors;
pub mod models;
pub mod registration;
pub mod session;
pub mod validate;

pub use credentials::CredentialStore;
pub use errors::{AuthError, AuthResult};
pub use models::{
    FacultyRecord, Identity, InternRecord, RegisteredUser, Role, RoleProfile, Session,
    StudentRecord, UserAccount, UserId,
};
pub use registration::{RegistrationCoordinator, SignupRequest};
pub use session::SessionManager;
