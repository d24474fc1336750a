//! PostgreSQL implementation of IdentityResolver and StudentDirectory.
//!
//! Both read the `users` table: `user_id` holds the student number,
//! `id` the internal user id, and `roles` the role names.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::evaluation::{RosterScope, SquadScope, StudentProfile};
use crate::domain::foundation::{DomainError, ErrorCode, Role, StudentId, UserId};
use crate::ports::{IdentityResolver, StudentDirectory};

/// Reads students from the `users` table.
pub struct PostgresStudentDirectory {
    pool: PgPool,
}

impl PostgresStudentDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    user_id: String,
    name: String,
    department: Option<String>,
    major: Option<String>,
    squad: Option<String>,
    class_id: Option<String>,
}

impl TryFrom<StudentRow> for StudentProfile {
    type Error = DomainError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        Ok(StudentProfile {
            student_id: StudentId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            name: row.name,
            department: row.department.unwrap_or_default(),
            major: row.major.unwrap_or_default(),
            squad: row.squad.unwrap_or_default(),
            class_id: row.class_id,
        })
    }
}

fn to_user_id(id: i64) -> Result<UserId, DomainError> {
    UserId::new(id)
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Invalid id: {}", e)))
}

#[async_trait]
impl IdentityResolver for PostgresStudentDirectory {
    async fn resolve(&self, student_id: &StudentId) -> Result<Option<UserId>, DomainError> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE user_id = $1")
            .bind(student_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::IdentityUnresolved,
                    format!("Failed to resolve student {}: {}", student_id, e),
                )
            })?;

        id.map(to_user_id).transpose()
    }
}

#[async_trait]
impl StudentDirectory for PostgresStudentDirectory {
    async fn find_students(&self, scope: &RosterScope) -> Result<Vec<StudentProfile>, DomainError> {
        let rows: Vec<StudentRow> = sqlx::query_as(
            r#"
            SELECT user_id, name, department, major, squad, class_id
            FROM users
            WHERE department = $1
              AND ($2::text IS NULL OR squad = $2)
              AND ($3::text IS NULL OR major = $3)
              AND $4 = ANY(roles)
            ORDER BY user_id
            "#,
        )
        .bind(&scope.department)
        .bind(scope.squad.as_deref())
        .bind(scope.major.as_deref())
        .bind(Role::Student.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list students", e))?;

        rows.into_iter().map(StudentProfile::try_from).collect()
    }

    async fn squad_members(&self, scope: &SquadScope) -> Result<Vec<UserId>, DomainError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE department = $1 AND squad = $2 AND $3 = ANY(roles)
            ORDER BY id
            "#,
        )
        .bind(&scope.department)
        .bind(&scope.squad)
        .bind(Role::Student.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list squad members", e))?;

        ids.into_iter().map(to_user_id).collect()
    }
}
