//! Class repository
//!
//! PostgreSQL implementation of [`ClassDirectory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flex_core::traits::Id;
use flex_models::{Class, ListingFields, NewClass};
use sqlx::{FromRow, PgPool};

use crate::directory::{ClassDirectory, ClassFilter, ClassQuery, SetAdd, SortOrder};
use crate::repository::RepositoryResult;
use crate::users::set_add_outcome;

/// Class database entity
#[derive(Debug, Clone, FromRow)]
pub struct ClassRow {
    pub id: i64,
    pub class_type: String,
    pub length: i32,
    pub wage: f64,
    pub class_date_day: String,
    pub class_date_time: String,
    pub start_date: DateTime<Utc>,
    pub description: String,
    pub posted_by: i64,
    pub studio: Option<String>,
    pub date_posted: DateTime<Utc>,
    pub user_applied: Vec<i64>,
}

impl From<ClassRow> for Class {
    fn from(row: ClassRow) -> Self {
        Class {
            id: row.id,
            class_type: row.class_type,
            length: row.length,
            wage: row.wage,
            class_date_day: row.class_date_day,
            class_date_time: row.class_date_time,
            start_date: row.start_date,
            description: row.description,
            posted_by: row.posted_by,
            studio: row.studio,
            date_posted: row.date_posted,
            user_applied: row.user_applied,
        }
    }
}

const CLASS_COLUMNS: &str = "id, class_type, length, wage, class_date_day, class_date_time, \
     start_date, description, posted_by, studio, date_posted, user_applied";

fn order_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::DatePostedDesc => "ORDER BY date_posted DESC, id DESC",
        SortOrder::DatePostedAsc => "ORDER BY date_posted ASC, id ASC",
    }
}

/// Class repository implementation
pub struct ClassRepository {
    pool: PgPool,
}

impl ClassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassDirectory for ClassRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Class>> {
        let row = sqlx::query_as::<_, ClassRow>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Class::from))
    }

    async fn query(&self, query: &ClassQuery) -> RepositoryResult<Vec<Class>> {
        let order = order_clause(query.sort);

        let rows = match &query.filter {
            ClassFilter::NotAppliedBy {
                user_id,
                class_type,
                days,
            } => {
                sqlx::query_as::<_, ClassRow>(&format!(
                    r#"
                    SELECT {CLASS_COLUMNS} FROM classes
                    WHERE NOT ($1 = ANY(user_applied))
                      AND ($2::text IS NULL OR class_type = $2)
                      AND (cardinality($3::text[]) = 0 OR class_date_day = ANY($3))
                    {order}
                    "#
                ))
                .bind(*user_id)
                .bind(class_type.as_deref())
                .bind(days)
                .fetch_all(&self.pool)
                .await?
            }
            ClassFilter::AppliedBy(user_id) => {
                sqlx::query_as::<_, ClassRow>(&format!(
                    "SELECT {CLASS_COLUMNS} FROM classes WHERE $1 = ANY(user_applied) {order}"
                ))
                .bind(*user_id)
                .fetch_all(&self.pool)
                .await?
            }
            ClassFilter::PostedBy(owner_id) => {
                sqlx::query_as::<_, ClassRow>(&format!(
                    "SELECT {CLASS_COLUMNS} FROM classes WHERE posted_by = $1 {order}"
                ))
                .bind(*owner_id)
                .fetch_all(&self.pool)
                .await?
            }
            ClassFilter::All => {
                sqlx::query_as::<_, ClassRow>(&format!("SELECT {CLASS_COLUMNS} FROM classes {order}"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Class::from).collect())
    }

    async fn add_to_applicant_set(&self, class_id: Id, user_id: Id) -> RepositoryResult<SetAdd> {
        let (found, added) = sqlx::query_as::<_, (bool, bool)>(
            r#"
            WITH target AS (
                SELECT id FROM classes WHERE id = $1
            ), updated AS (
                UPDATE classes
                SET user_applied = array_append(user_applied, $2)
                WHERE id = $1 AND NOT ($2 = ANY(user_applied))
                RETURNING id
            )
            SELECT EXISTS(SELECT 1 FROM target), EXISTS(SELECT 1 FROM updated)
            "#,
        )
        .bind(class_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(set_add_outcome(found, added))
    }

    async fn remove_from_applicant_set(&self, class_id: Id, user_id: Id) -> RepositoryResult<()> {
        sqlx::query("UPDATE classes SET user_applied = array_remove(user_applied, $2) WHERE id = $1")
            .bind(class_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_fields(
        &self,
        class_id: Id,
        owner_id: Id,
        fields: &ListingFields,
    ) -> RepositoryResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE classes SET
                class_type = $1,
                length = $2,
                wage = $3,
                class_date_day = $4,
                class_date_time = $5,
                start_date = $6,
                description = $7
            WHERE id = $8 AND posted_by = $9
            "#,
        )
        .bind(&fields.class_type)
        .bind(fields.length)
        .bind(fields.wage)
        .bind(&fields.class_date_day)
        .bind(&fields.class_date_time)
        .bind(fields.start_date)
        .bind(&fields.description)
        .bind(class_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_one(&self, class_id: Id, owner_id: Id) -> RepositoryResult<u64> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1 AND posted_by = $2")
            .bind(class_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn create(&self, class: NewClass) -> RepositoryResult<Class> {
        let fields = &class.fields;
        let row = sqlx::query_as::<_, ClassRow>(&format!(
            r#"
            INSERT INTO classes (
                class_type, length, wage, class_date_day, class_date_time,
                start_date, description, posted_by, studio, date_posted
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10
            )
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(&fields.class_type)
        .bind(fields.length)
        .bind(fields.wage)
        .bind(&fields.class_date_day)
        .bind(&fields.class_date_time)
        .bind(fields.start_date)
        .bind(&fields.description)
        .bind(class.posted_by)
        .bind(&class.studio)
        .bind(class.date_posted)
        .fetch_one(&self.pool)
        .await?;

        Ok(Class::from(row))
    }
}
