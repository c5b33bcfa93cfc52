//! Repository trait over user and profile reads, for testability and
//! dependency injection.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::auth::{
    AuthResult, FacultyRecord, InternRecord, Role, StudentRecord, UserAccount, UserId,
};

/// Read and update operations on user accounts and role profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up the account for a login attempt.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserAccount>>;

    /// Student profile view, joined across `users` and `students`.
    async fn student_profile(&self, user_id: UserId) -> AuthResult<Option<StudentRecord>>;

    /// Faculty profile view, joined across `users` and `faculty`.
    async fn faculty_profile(&self, user_id: UserId) -> AuthResult<Option<FacultyRecord>>;

    /// Intern profile view, joined across `users` and `interns`.
    async fn intern_profile(&self, user_id: UserId) -> AuthResult<Option<InternRecord>>;

    /// Update the mutable fields of a student profile.
    async fn update_student_profile(
        &self,
        user_id: UserId,
        major_id: i64,
        year_of_study: i32,
    ) -> AuthResult<()>;
}

/// PostgreSQL implementation of [`UserRepository`].
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserAccount>> {
        let row = sqlx::query(
            "SELECT user_id, first_name, last_name, email, password_hash, role
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(r) => Ok(Some(UserAccount {
                user_id: r.get("user_id"),
                first_name: r.get("first_name"),
                last_name: r.get("last_name"),
                email: r.get("email"),
                password_hash: r.get("password_hash"),
                role: Role::parse(r.get::<&str, _>("role"))?,
            })),
            None => Ok(None),
        }
    }

    async fn student_profile(&self, user_id: UserId) -> AuthResult<Option<StudentRecord>> {
        let row = sqlx::query(
            "SELECT u.user_id, u.first_name, u.last_name, u.email, u.dob,
                    s.major_id, s.year_of_study
             FROM users u
             JOIN students s ON s.student_id = u.user_id
             WHERE u.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| StudentRecord {
            user_id: r.get("user_id"),
            first_name: r.get("first_name"),
            last_name: r.get("last_name"),
            email: r.get("email"),
            dob: r.get("dob"),
            major_id: r.get("major_id"),
            year_of_study: r.get("year_of_study"),
        }))
    }

    async fn faculty_profile(&self, user_id: UserId) -> AuthResult<Option<FacultyRecord>> {
        let row = sqlx::query(
            "SELECT u.user_id, u.first_name, u.last_name, u.email,
                    f.department_id, f.designation
             FROM users u
             JOIN faculty f ON f.faculty_id = u.user_id
             WHERE u.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| FacultyRecord {
            user_id: r.get("user_id"),
            first_name: r.get("first_name"),
            last_name: r.get("last_name"),
            email: r.get("email"),
            department_id: r.get("department_id"),
            designation: r.get("designation"),
        }))
    }

    async fn intern_profile(&self, user_id: UserId) -> AuthResult<Option<InternRecord>> {
        let row = sqlx::query(
            "SELECT u.user_id, u.first_name, u.last_name, u.email,
                    i.assigned_department, i.start_date, i.end_date
             FROM users u
             JOIN interns i ON i.intern_id = u.user_id
             WHERE u.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|r| InternRecord {
            user_id: r.get("user_id"),
            first_name: r.get("first_name"),
            last_name: r.get("last_name"),
            email: r.get("email"),
            assigned_department: r.get("assigned_department"),
            start_date: r.get("start_date"),
            end_date: r.get("end_date"),
        }))
    }

    async fn update_student_profile(
        &self,
        user_id: UserId,
        major_id: i64,
        year_of_study: i32,
    ) -> AuthResult<()> {
        sqlx::query("UPDATE students SET major_id = $2, year_of_study = $3 WHERE student_id = $1")
            .bind(user_id)
            .bind(major_id)
            .bind(year_of_study)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
