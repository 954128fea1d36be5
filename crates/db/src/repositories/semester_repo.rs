//! Repository for the `semesters` table.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::semester::{CreateSemester, Semester, SemesterSummary, UpdateSemester};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, is_active, created_at, updated_at";

/// Provides CRUD operations for semesters.
pub struct SemesterRepo;

impl SemesterRepo {
    /// Insert a new semester, returning the created row.
    ///
    /// If `is_active` is `None` in the input, the semester starts active.
    pub async fn create(pool: &PgPool, input: &CreateSemester) -> Result<Semester, sqlx::Error> {
        let query = format!(
            "INSERT INTO semesters (name, is_active)
             VALUES ($1, COALESCE($2, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(input.name.trim())
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Semester>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM semesters WHERE id = $1");
        sqlx::query_as::<_, Semester>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all semesters with their class counts, newest name first.
    pub async fn list(pool: &PgPool) -> Result<Vec<SemesterSummary>, sqlx::Error> {
        sqlx::query_as::<_, SemesterSummary>(
            "SELECT s.id, s.name, s.is_active, s.created_at, s.updated_at,
                    (SELECT COUNT(*) FROM classes c WHERE c.semester_id = s.id) AS class_count
             FROM semesters s
             ORDER BY s.name DESC, s.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Active semesters only, for pickers.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Semester>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM semesters WHERE is_active ORDER BY name DESC, id");
        sqlx::query_as::<_, Semester>(&query).fetch_all(pool).await
    }

    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM semesters WHERE is_active")
            .fetch_one(pool)
            .await
    }

    /// Update a semester. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSemester,
    ) -> Result<Option<Semester>, sqlx::Error> {
        let query = format!(
            "UPDATE semesters SET
                name = COALESCE($2, name),
                is_active = COALESCE($3, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Semester>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a semester. Fails with a foreign-key violation while classes remain.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM semesters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
