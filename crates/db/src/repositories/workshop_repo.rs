//! Repository for the `workshops` table and the `student_workshops` roster.

use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoResult;
use crate::models::student::Student;
use crate::models::workshop::{
    CreateWorkshop, NewWorkshop, UpdateWorkshop, Workshop, WorkshopFilter, WorkshopSummary,
};
use crate::repositories::checks::{ensure_active_students, like_pattern, PgTx};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, default_location, created_at, updated_at";

/// Provides CRUD operations for workshops and their student rosters.
pub struct WorkshopRepo;

impl WorkshopRepo {
    /// Insert a workshop and, if given, its initial roster.
    pub async fn create(pool: &PgPool, input: &CreateWorkshop) -> RepoResult<Workshop> {
        let mut tx = pool.begin().await?;
        let workshop = Self::insert_inner(&mut tx, &input.name, &input.default_location).await?;

        if let Some(student_ids) = &input.student_ids {
            Self::replace_roster_inner(&mut tx, workshop.id, student_ids).await?;
        }

        tx.commit().await?;
        Ok(workshop)
    }

    /// Insert several workshops in one transaction. Nothing is written if any insert fails.
    pub async fn bulk_create(
        pool: &PgPool,
        items: &[NewWorkshop],
    ) -> Result<Vec<Workshop>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            created.push(Self::insert_inner(&mut tx, &item.name, &item.default_location).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workshops WHERE id = $1");
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List workshops by name, each with its count of active-semester students.
    pub async fn list(
        pool: &PgPool,
        filter: &WorkshopFilter,
    ) -> Result<Vec<WorkshopSummary>, sqlx::Error> {
        sqlx::query_as::<_, WorkshopSummary>(
            "SELECT w.id, w.name, w.default_location, w.created_at, w.updated_at,
                    (SELECT COUNT(*)
                     FROM student_workshops sw
                     JOIN students s ON s.id = sw.student_id
                     JOIN classes c ON c.id = s.class_id
                     JOIN semesters se ON se.id = c.semester_id
                     WHERE sw.workshop_id = w.id AND se.is_active) AS student_count
             FROM workshops w
             WHERE ($1::TEXT IS NULL OR w.name ILIKE $1)
             ORDER BY w.name, w.id",
        )
        .bind(like_pattern(filter.q.as_deref()))
        .fetch_all(pool)
        .await
    }

    /// Update a workshop. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkshop,
    ) -> Result<Option<Workshop>, sqlx::Error> {
        let query = format!(
            "UPDATE workshops SET
                name = COALESCE($2, name),
                default_location = COALESCE($3, default_location)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.default_location.as_deref().map(str::trim))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workshops WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every student enrolled in the workshop, by name.
    pub async fn list_students(pool: &PgPool, id: DbId) -> Result<Vec<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            "SELECT s.id, s.class_id, s.name, s.created_at, s.updated_at
             FROM students s
             JOIN student_workshops sw ON sw.student_id = s.id
             WHERE sw.workshop_id = $1
             ORDER BY s.name, s.id",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// Replace the active-semester part of a workshop's roster.
    ///
    /// Enrollments of students in inactive semesters are kept as history.
    pub async fn set_students(
        pool: &PgPool,
        id: DbId,
        student_ids: &[DbId],
    ) -> RepoResult<Vec<Student>> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> = sqlx::query_scalar("SELECT id FROM workshops WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(CoreError::NotFound {
                entity: "Workshop",
                id,
            }
            .into());
        }

        Self::replace_roster_inner(&mut tx, id, student_ids).await?;
        tx.commit().await?;

        Ok(Self::list_students(pool, id).await?)
    }

    async fn insert_inner(
        tx: &mut PgTx<'_>,
        name: &str,
        default_location: &str,
    ) -> Result<Workshop, sqlx::Error> {
        let query = format!(
            "INSERT INTO workshops (name, default_location)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workshop>(&query)
            .bind(name.trim())
            .bind(default_location.trim())
            .fetch_one(&mut **tx)
            .await
    }

    /// Replace roster entries within an existing transaction.
    async fn replace_roster_inner(
        tx: &mut PgTx<'_>,
        workshop_id: DbId,
        student_ids: &[DbId],
    ) -> RepoResult<()> {
        let student_ids = ensure_active_students(tx, student_ids).await?;

        sqlx::query(
            "DELETE FROM student_workshops sw
             USING students s, classes c, semesters se
             WHERE sw.workshop_id = $1
               AND s.id = sw.student_id
               AND c.id = s.class_id
               AND se.id = c.semester_id
               AND se.is_active",
        )
        .bind(workshop_id)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO student_workshops (student_id, workshop_id)
             SELECT unnest($1::BIGINT[]), $2
             ON CONFLICT DO NOTHING",
        )
        .bind(&student_ids)
        .bind(workshop_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
