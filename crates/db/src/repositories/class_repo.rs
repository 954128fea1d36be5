//! Repository for the `classes` table.

use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoResult;
use crate::models::class::{
    Class, ClassCopyResult, ClassFilter, ClassSummary, CopyClass, CreateClass, UpdateClass,
};
use crate::repositories::checks::{ensure_active_semester, like_pattern};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, semester_id, name, created_at, updated_at";

const SUMMARY_SELECT: &str = "SELECT c.id, c.semester_id, s.name AS semester_name,
        s.is_active AS semester_is_active, c.name,
        (SELECT COUNT(*) FROM students st WHERE st.class_id = c.id) AS student_count,
        c.created_at, c.updated_at
     FROM classes c
     JOIN semesters s ON s.id = c.semester_id";

/// Provides CRUD operations for classes.
pub struct ClassRepo;

impl ClassRepo {
    /// Insert a new class into an active semester.
    pub async fn create(pool: &PgPool, input: &CreateClass) -> RepoResult<Class> {
        let mut tx = pool.begin().await?;
        ensure_active_semester(&mut tx, input.semester_id).await?;

        let query = format!(
            "INSERT INTO classes (semester_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let class = sqlx::query_as::<_, Class>(&query)
            .bind(input.semester_id)
            .bind(input.name.trim())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(class)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Class>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM classes WHERE id = $1");
        sqlx::query_as::<_, Class>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a class joined with its semester and student count.
    pub async fn find_summary(pool: &PgPool, id: DbId) -> Result<Option<ClassSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE c.id = $1");
        sqlx::query_as::<_, ClassSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List classes, newest semester first, then by name.
    ///
    /// Classes of inactive semesters are hidden unless `include_inactive` is set.
    pub async fn list(pool: &PgPool, filter: &ClassFilter) -> Result<Vec<ClassSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE ($1::TEXT IS NULL OR c.name ILIKE $1)
               AND ($2::BIGINT IS NULL OR c.semester_id = $2)
               AND ($3 OR s.is_active)
             ORDER BY s.name DESC, c.name, c.id"
        );
        sqlx::query_as::<_, ClassSummary>(&query)
            .bind(like_pattern(filter.q.as_deref()))
            .bind(filter.semester_id)
            .bind(filter.include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a class. Moving it to another semester requires that semester be active.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateClass) -> RepoResult<Option<Class>> {
        let mut tx = pool.begin().await?;
        if let Some(semester_id) = input.semester_id {
            ensure_active_semester(&mut tx, semester_id).await?;
        }

        let query = format!(
            "UPDATE classes SET
                semester_id = COALESCE($2, semester_id),
                name = COALESCE($3, name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let class = sqlx::query_as::<_, Class>(&query)
            .bind(id)
            .bind(input.semester_id)
            .bind(input.name.as_deref().map(str::trim))
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(class)
    }

    /// Delete a class. Its students and their allocations cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Copy a class and its students (with fixed workshops) into an active semester.
    ///
    /// Allocations are not copied. Runs in a single transaction.
    pub async fn copy_to_semester(
        pool: &PgPool,
        id: DbId,
        input: &CopyClass,
    ) -> RepoResult<ClassCopyResult> {
        let mut tx = pool.begin().await?;

        let source_query = format!("SELECT {COLUMNS} FROM classes WHERE id = $1");
        let source = sqlx::query_as::<_, Class>(&source_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CoreError::NotFound { entity: "Class", id })?;

        ensure_active_semester(&mut tx, input.semester_id).await?;

        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or(source.name.as_str());
        let insert = format!(
            "INSERT INTO classes (semester_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let class = sqlx::query_as::<_, Class>(&insert)
            .bind(input.semester_id)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        let students: Vec<(DbId, String)> =
            sqlx::query_as("SELECT id, name FROM students WHERE class_id = $1 ORDER BY name, id")
                .bind(source.id)
                .fetch_all(&mut *tx)
                .await?;

        for (old_id, student_name) in &students {
            let new_id: DbId = sqlx::query_scalar(
                "INSERT INTO students (class_id, name) VALUES ($1, $2) RETURNING id",
            )
            .bind(class.id)
            .bind(student_name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO student_workshops (student_id, workshop_id)
                 SELECT $1, workshop_id FROM student_workshops WHERE student_id = $2",
            )
            .bind(new_id)
            .bind(old_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(ClassCopyResult {
            class,
            students_copied: students.len() as u64,
        })
    }
}
