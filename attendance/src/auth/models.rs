//! Authentication data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::AuthError;

/// User ID type. Institutionally assigned, supplied by the registrant.
pub type UserId = i64;

/// The three account roles. The role value on a user row determines which
/// single role-extension row must exist for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Intern,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Intern => "intern",
        }
    }

    /// Parse a role string, rejecting anything outside the closed set.
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        match value {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            "intern" => Ok(Role::Intern),
            _ => Err(AuthError::InvalidRole),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base user row as read for credential verification.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl UserAccount {
    /// Display name used in session claims and login responses.
    pub fn username(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Identity claims returned by a successful session validation and handed
/// to protected handlers.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Role-extension record; exactly one variant exists per user, matching
/// the user's role.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleProfile {
    Student {
        major_id: i64,
        year_of_study: i32,
    },
    Faculty {
        department_id: i64,
        designation: String,
    },
    Intern {
        assigned_department: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

/// Student profile view joined across `users` and `students`.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRecord {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub dob: NaiveDate,
    pub major_id: i64,
    pub year_of_study: i32,
}

/// Faculty profile view joined across `users` and `faculty`.
#[derive(Debug, Clone, Serialize)]
pub struct FacultyRecord {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: i64,
    pub designation: String,
}

/// Intern profile view joined across `users` and `interns`.
#[derive(Debug, Clone, Serialize)]
pub struct InternRecord {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub assigned_department: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Server-held session state for one authenticated browser session.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
    pub csrf_token: String,
    pub logged_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Student, Role::Faculty, Role::Intern] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(Role::parse("admin"), Err(AuthError::InvalidRole)));
        assert!(matches!(Role::parse(""), Err(AuthError::InvalidRole)));
        // Case matters: roles are stored lowercase.
        assert!(matches!(
            Role::parse("Student"),
            Err(AuthError::InvalidRole)
        ));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Faculty).unwrap(),
            "\"faculty\""
        );
    }

    #[test]
    fn username_joins_names() {
        let account = UserAccount {
            user_id: 7,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.edu".to_string(),
            password_hash: String::new(),
            role: Role::Faculty,
        };
        assert_eq!(account.username(), "Ada Lovelace");
    }
}
