//! Registration coordinator: validated, all-or-nothing account creation.
//!
//! A signup writes the base `users` row and exactly one role-extension
//! row inside a single transaction, so no orphaned base account is ever
//! observable. Conflict pre-checks are advisory only; the
//! database unique constraints are the real invariant, and a violation
//! surfaced at insert time maps to the same 409 errors the pre-checks
//! produce.

use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;

use crate::audit::{Action, ActivityAuditor, RequestMeta};

use super::credentials::{CredentialStore, MIN_STRENGTH};
use super::errors::{AuthError, AuthResult};
use super::models::{RegisteredUser, Role, RoleProfile, UserId};
use super::validate;

/// Raw signup payload. Role-specific fields are optional at the type level
/// and required by validation once the role selects them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub user_id: Option<i64>,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub role: String,

    // student
    pub major_id: Option<i64>,
    pub year_of_study: Option<i32>,
    // faculty
    pub department_id: Option<i64>,
    pub designation: Option<String>,
    // intern
    pub assigned_department: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Signup data after sanitization and base validation, ready to write.
#[derive(Debug, Clone)]
struct ValidSignup {
    user_id: UserId,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    dob: chrono::NaiveDate,
    role: Role,
    major_id: Option<i64>,
    year_of_study: Option<i32>,
    department_id: Option<i64>,
    designation: Option<String>,
    assigned_department: Option<i64>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl ValidSignup {
    /// Extract the role-extension record the selected role requires.
    ///
    /// Called inside the registration transaction; an error here aborts
    /// the whole write, rolling back the base user row too.
    fn role_profile(&self) -> AuthResult<RoleProfile> {
        match self.role {
            Role::Student => match (self.major_id, self.year_of_study) {
                (Some(major_id), Some(year_of_study)) => Ok(RoleProfile::Student {
                    major_id,
                    year_of_study,
                }),
                _ => Err(AuthError::MissingRoleFields(
                    "Major and year of study are required for students".to_string(),
                )),
            },
            Role::Faculty => match (self.department_id, self.designation.as_ref()) {
                (Some(department_id), Some(designation)) if !designation.is_empty() => {
                    Ok(RoleProfile::Faculty {
                        department_id,
                        designation: designation.clone(),
                    })
                }
                _ => Err(AuthError::MissingRoleFields(
                    "Department and designation are required for faculty".to_string(),
                )),
            },
            Role::Intern => match (
                self.assigned_department,
                self.start_date.as_ref(),
                self.end_date.as_ref(),
            ) {
                (Some(assigned_department), Some(start), Some(end))
                    if !start.is_empty() && !end.is_empty() =>
                {
                    Ok(RoleProfile::Intern {
                        assigned_department,
                        start_date: validate::parse_date(start)?,
                        end_date: validate::parse_date(end)?,
                    })
                }
                _ => Err(AuthError::MissingRoleFields(
                    "Assigned department, start date, and end date are required for interns"
                        .to_string(),
                )),
            },
        }
    }
}

/// Validate and sanitize a signup request. Pure; no storage access.
///
/// Steps, in order, first failure wins: required base fields present,
/// string fields sanitized, email syntax, date of birth real and age
/// >= 16, user id positive, role in the closed set, password strength.
fn validate_signup(request: &SignupRequest) -> AuthResult<ValidSignup> {
    if request.first_name.trim().is_empty() {
        return Err(AuthError::MissingField("first_name"));
    }
    if request.last_name.trim().is_empty() {
        return Err(AuthError::MissingField("last_name"));
    }
    if request.email.trim().is_empty() {
        return Err(AuthError::MissingField("email"));
    }
    if request.password.is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    let Some(user_id) = request.user_id else {
        return Err(AuthError::MissingField("user_id"));
    };
    if request.dob.trim().is_empty() {
        return Err(AuthError::MissingField("dob"));
    }
    if request.role.trim().is_empty() {
        return Err(AuthError::MissingField("role"));
    }

    // The password is deliberately not sanitized: it is a secret fed to
    // the hasher, never stored or rendered, and escaping it here would
    // break verification at login.
    let first_name = validate::sanitize(&request.first_name);
    let last_name = validate::sanitize(&request.last_name);
    let email = validate::sanitize(&request.email);
    let role_raw = validate::sanitize(&request.role);

    if !validate::is_valid_email(&email) {
        return Err(AuthError::InvalidEmail);
    }

    let dob = validate::parse_dob(&validate::sanitize(&request.dob))?;

    if user_id <= 0 {
        return Err(AuthError::InvalidUserId);
    }

    let role = Role::parse(&role_raw)?;

    if CredentialStore::strength(&request.password) < MIN_STRENGTH {
        return Err(AuthError::WeakPassword);
    }

    Ok(ValidSignup {
        user_id,
        first_name,
        last_name,
        email,
        password: request.password.clone(),
        dob,
        role,
        major_id: request.major_id,
        year_of_study: request.year_of_study,
        department_id: request.department_id,
        designation: request.designation.as_deref().map(validate::sanitize),
        assigned_department: request.assigned_department,
        start_date: request.start_date.as_deref().map(validate::sanitize),
        end_date: request.end_date.as_deref().map(validate::sanitize),
    })
}

/// Map a unique-constraint violation raised at insert time to the same
/// conflict error the advisory pre-check would have produced.
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return match db_err.constraint() {
                Some("users_email_key") => AuthError::EmailConflict,
                _ => AuthError::UserIdConflict,
            };
        }
    }
    AuthError::Database(err)
}

/// Coordinates the signup pipeline end to end.
#[derive(Clone)]
pub struct RegistrationCoordinator {
    pool: Arc<PgPool>,
    credentials: Arc<CredentialStore>,
    auditor: Arc<ActivityAuditor>,
}

impl RegistrationCoordinator {
    pub fn new(
        pool: Arc<PgPool>,
        credentials: Arc<CredentialStore>,
        auditor: Arc<ActivityAuditor>,
    ) -> Self {
        Self {
            pool,
            credentials,
            auditor,
        }
    }

    /// Register a new account: base user row plus exactly one
    /// role-extension row, atomically.
    ///
    /// Any failure before commit leaves storage untouched; dropping the
    /// open transaction on an error path rolls back the user insert along
    /// with everything else.
    pub async fn register(
        &self,
        request: SignupRequest,
        meta: &RequestMeta,
    ) -> AuthResult<RegisteredUser> {
        let clean = validate_signup(&request)?;

        // Advisory pre-checks for friendlier errors in the common case.
        // Two concurrent signups can both pass these; the unique
        // constraints below are the actual enforcer.
        let email_taken = sqlx::query("SELECT user_id FROM users WHERE email = $1")
            .bind(&clean.email)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if email_taken.is_some() {
            return Err(AuthError::EmailConflict);
        }

        let id_taken = sqlx::query("SELECT user_id FROM users WHERE user_id = $1")
            .bind(clean.user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if id_taken.is_some() {
            return Err(AuthError::UserIdConflict);
        }

        let password_hash = self.credentials.hash(&clean.password)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, last_name, email, password_hash, role, dob)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(clean.user_id)
        .bind(&clean.first_name)
        .bind(&clean.last_name)
        .bind(&clean.email)
        .bind(&password_hash)
        .bind(clean.role.as_str())
        .bind(clean.dob)
        .execute(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        match clean.role_profile()? {
            RoleProfile::Student {
                major_id,
                year_of_study,
            } => {
                sqlx::query(
                    "INSERT INTO students (student_id, major_id, year_of_study) VALUES ($1, $2, $3)",
                )
                .bind(clean.user_id)
                .bind(major_id)
                .bind(year_of_study)
                .execute(&mut *tx)
                .await?;
            }
            RoleProfile::Faculty {
                department_id,
                designation,
            } => {
                sqlx::query(
                    "INSERT INTO faculty (faculty_id, department_id, designation) VALUES ($1, $2, $3)",
                )
                .bind(clean.user_id)
                .bind(department_id)
                .bind(&designation)
                .execute(&mut *tx)
                .await?;
            }
            RoleProfile::Intern {
                assigned_department,
                start_date,
                end_date,
            } => {
                sqlx::query(
                    "INSERT INTO interns (intern_id, assigned_department, start_date, end_date) VALUES ($1, $2, $3, $4)",
                )
                .bind(clean.user_id)
                .bind(assigned_department)
                .bind(start_date)
                .bind(end_date)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        // Best-effort; a failed audit write never fails the registration.
        self.auditor
            .log(
                clean.user_id,
                Action::Registration,
                &format!("New {} account created", clean.role),
                meta,
            )
            .await;

        Ok(RegisteredUser {
            user_id: clean.user_id,
            email: clean.email,
            role: clean.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_request() -> SignupRequest {
        SignupRequest {
            first_name: "Alice".to_string(),
            last_name: "Nguyen".to_string(),
            email: "alice@example.edu".to_string(),
            password: "Password1!".to_string(),
            user_id: Some(20_240_001),
            dob: "2002-03-14".to_string(),
            role: "student".to_string(),
            major_id: Some(3),
            year_of_study: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn valid_student_request_passes() {
        let clean = validate_signup(&student_request()).unwrap();
        assert_eq!(clean.user_id, 20_240_001);
        assert_eq!(clean.role, Role::Student);
        assert_eq!(
            clean.role_profile().unwrap(),
            RoleProfile::Student {
                major_id: 3,
                year_of_study: 2
            }
        );
    }

    #[test]
    fn each_missing_base_field_is_named() {
        for (field, mutate) in [
            (
                "first_name",
                Box::new(|r: &mut SignupRequest| r.first_name.clear())
                    as Box<dyn Fn(&mut SignupRequest)>,
            ),
            ("last_name", Box::new(|r| r.last_name.clear())),
            ("email", Box::new(|r| r.email.clear())),
            ("password", Box::new(|r| r.password.clear())),
            ("user_id", Box::new(|r| r.user_id = None)),
            ("dob", Box::new(|r| r.dob.clear())),
            ("role", Box::new(|r| r.role.clear())),
        ] {
            let mut request = student_request();
            mutate(&mut request);
            match validate_signup(&request) {
                Err(AuthError::MissingField(name)) => assert_eq!(name, field),
                other => panic!("expected MissingField({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn names_are_sanitized() {
        let mut request = student_request();
        request.first_name = "  <b>Alice</b> ".to_string();
        let clean = validate_signup(&request).unwrap();
        assert_eq!(clean.first_name, "&lt;b&gt;Alice&lt;/b&gt;");
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut request = student_request();
        request.email = "alice-at-example.edu".to_string();
        assert!(matches!(
            validate_signup(&request),
            Err(AuthError::InvalidEmail)
        ));
    }

    #[test]
    fn underage_dob_is_rejected() {
        let mut request = student_request();
        let recent = chrono::Utc::now().date_naive() - chrono::Days::new(365 * 12);
        request.dob = recent.format("%Y-%m-%d").to_string();
        assert!(matches!(validate_signup(&request), Err(AuthError::Underage)));
    }

    #[test]
    fn nonsense_dob_is_rejected() {
        let mut request = student_request();
        request.dob = "2002-02-30".to_string();
        assert!(matches!(
            validate_signup(&request),
            Err(AuthError::InvalidDate)
        ));
    }

    #[test]
    fn non_positive_user_id_is_rejected() {
        let mut request = student_request();
        request.user_id = Some(0);
        assert!(matches!(
            validate_signup(&request),
            Err(AuthError::InvalidUserId)
        ));
        request.user_id = Some(-5);
        assert!(matches!(
            validate_signup(&request),
            Err(AuthError::InvalidUserId)
        ));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let mut request = student_request();
        request.role = "administrator".to_string();
        assert!(matches!(
            validate_signup(&request),
            Err(AuthError::InvalidRole)
        ));
    }

    #[test]
    fn weak_password_is_rejected() {
        let mut request = student_request();
        request.password = "password".to_string();
        assert!(matches!(
            validate_signup(&request),
            Err(AuthError::WeakPassword)
        ));
    }

    #[test]
    fn student_missing_year_of_study_fails_profile_extraction() {
        let mut request = student_request();
        request.year_of_study = None;
        let clean = validate_signup(&request).unwrap();
        assert!(matches!(
            clean.role_profile(),
            Err(AuthError::MissingRoleFields(_))
        ));
    }

    #[test]
    fn faculty_profile_requires_both_fields() {
        let mut request = student_request();
        request.role = "faculty".to_string();
        request.department_id = Some(9);
        request.designation = None;
        let clean = validate_signup(&request).unwrap();
        assert!(matches!(
            clean.role_profile(),
            Err(AuthError::MissingRoleFields(_))
        ));

        request.designation = Some("Professor".to_string());
        let clean = validate_signup(&request).unwrap();
        assert_eq!(
            clean.role_profile().unwrap(),
            RoleProfile::Faculty {
                department_id: 9,
                designation: "Professor".to_string()
            }
        );
    }

    #[test]
    fn intern_profile_parses_both_dates() {
        let mut request = student_request();
        request.role = "intern".to_string();
        request.assigned_department = Some(4);
        request.start_date = Some("2026-01-15".to_string());
        request.end_date = Some("2026-07-15".to_string());
        let clean = validate_signup(&request).unwrap();
        assert!(matches!(
            clean.role_profile().unwrap(),
            RoleProfile::Intern { .. }
        ));

        request.end_date = Some("2026-13-01".to_string());
        let clean = validate_signup(&request).unwrap();
        assert!(matches!(clean.role_profile(), Err(AuthError::InvalidDate)));
    }

    #[test]
    fn unique_violation_mapping_prefers_constraint_name() {
        let err = map_unique_violation(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AuthError::Database(_)));
    }
}
