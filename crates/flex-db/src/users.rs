//! User repository
//!
//! PostgreSQL implementation of [`UserDirectory`]. The applied set is a
//! `BIGINT[]` column mutated with single conditional statements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flex_core::traits::Id;
use flex_core::types::UserRole;
use flex_models::{NewUser, User};
use sqlx::{FromRow, PgPool};

use crate::directory::{SetAdd, UserDirectory};
use crate::repository::{RepositoryError, RepositoryResult};

/// User database entity
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub studio: Option<String>,
    pub role: String,
    pub class_applied: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: UserRole = row
            .role
            .parse()
            .map_err(|e| RepositoryError::Validation(format!("user {}: {}", row.id, e)))?;

        Ok(User {
            id: row.id,
            email: row.email,
            hashed_password: row.hashed_password,
            first_name: row.first_name,
            last_name: row.last_name,
            studio: row.studio,
            role,
            class_applied: row.class_applied,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, hashed_password, first_name, last_name, studio, role, class_applied, created_at";

/// User repository implementation
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, hashed_password, first_name, last_name, studio, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.studio)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("email {} already registered", user.email))
            }
            other => RepositoryError::Database(other),
        })?;

        User::try_from(row)
    }

    async fn add_to_applied_set(&self, user_id: Id, class_id: Id) -> RepositoryResult<SetAdd> {
        // Row lock on the UPDATE re-checks the ANY() predicate, so concurrent
        // adds of the same member cannot both succeed.
        let (found, added) = sqlx::query_as::<_, (bool, bool)>(
            r#"
            WITH target AS (
                SELECT id FROM users WHERE id = $1
            ), updated AS (
                UPDATE users
                SET class_applied = array_append(class_applied, $2)
                WHERE id = $1 AND NOT ($2 = ANY(class_applied))
                RETURNING id
            )
            SELECT EXISTS(SELECT 1 FROM target), EXISTS(SELECT 1 FROM updated)
            "#,
        )
        .bind(user_id)
        .bind(class_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(set_add_outcome(found, added))
    }

    async fn remove_from_applied_set(&self, user_id: Id, class_id: Id) -> RepositoryResult<()> {
        sqlx::query(
            "UPDATE users SET class_applied = array_remove(class_applied, $2) WHERE id = $1",
        )
        .bind(user_id)
        .bind(class_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_reference_from_all(&self, class_id: Id) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET class_applied = array_remove(class_applied, $1)
            WHERE $1 = ANY(class_applied)
            "#,
        )
        .bind(class_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_with_applications(&self) -> RepositoryResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE cardinality(class_applied) > 0 ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

pub(crate) fn set_add_outcome(found: bool, added: bool) -> SetAdd {
    match (found, added) {
        (_, true) => SetAdd::Added,
        (true, false) => SetAdd::AlreadyPresent,
        (false, false) => SetAdd::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: 3,
            email: "test@user.com".into(),
            hashed_password: "$argon2id$v=19$...".into(),
            first_name: "first".into(),
            last_name: "last".into(),
            studio: Some("test studio".into()),
            role: role.into(),
            class_applied: vec![1, 2],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_to_user() {
        let user = User::try_from(row("studio")).unwrap();
        assert_eq!(user.role, UserRole::Studio);
        assert_eq!(user.class_applied, vec![1, 2]);
    }

    #[test]
    fn test_row_with_unknown_role_is_rejected() {
        let err = User::try_from(row("admin")).unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }

    #[test]
    fn test_set_add_outcome() {
        assert_eq!(set_add_outcome(true, true), SetAdd::Added);
        assert_eq!(set_add_outcome(true, false), SetAdd::AlreadyPresent);
        assert_eq!(set_add_outcome(false, false), SetAdd::Missing);
    }
}
