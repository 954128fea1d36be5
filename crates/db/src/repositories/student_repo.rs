//! Repository for the `students` table and fixed workshop enrollment.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoResult;
use crate::models::student::{
    CreateStudent, EligibleStudent, Student, StudentAllocation, StudentFilter, StudentSummary,
    UpdateStudent,
};
use crate::repositories::checks::{
    ensure_class_in_active_semester, ensure_workshops_exist, like_pattern, PgTx,
    IN_EVENT_WORKSHOPS,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, class_id, name, created_at, updated_at";

const SUMMARY_SELECT: &str = "SELECT s.id, s.class_id, c.name AS class_name,
        c.semester_id, se.name AS semester_name, s.name,
        COALESCE(
            (SELECT array_agg(sw.workshop_id ORDER BY sw.workshop_id)
             FROM student_workshops sw WHERE sw.student_id = s.id),
            '{}'::BIGINT[]
        ) AS workshop_ids,
        COALESCE(
            (SELECT SUM(e.weight)
             FROM allocations a JOIN events e ON e.id = a.event_id
             WHERE a.student_id = s.id AND a.status_id = 2 AND NOT e.is_cancelled),
            0
        )::BIGINT AS total_points,
        s.created_at, s.updated_at
     FROM students s
     JOIN classes c ON c.id = s.class_id
     JOIN semesters se ON se.id = c.semester_id";

/// Provides CRUD operations for students.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a student into a class of an active semester.
    pub async fn create(pool: &PgPool, input: &CreateStudent) -> RepoResult<Student> {
        let mut tx = pool.begin().await?;
        ensure_class_in_active_semester(&mut tx, input.class_id).await?;

        let student = Self::insert_inner(&mut tx, input.class_id, &input.name).await?;
        if let Some(workshop_ids) = &input.workshop_ids {
            Self::set_workshops_inner(&mut tx, student.id, workshop_ids).await?;
        }

        tx.commit().await?;
        Ok(student)
    }

    /// Insert many students into one class. All-or-nothing.
    pub async fn bulk_create(
        pool: &PgPool,
        class_id: DbId,
        names: &[String],
    ) -> RepoResult<Vec<Student>> {
        let mut tx = pool.begin().await?;
        ensure_class_in_active_semester(&mut tx, class_id).await?;

        let mut created = Vec::with_capacity(names.len());
        for name in names {
            created.push(Self::insert_inner(&mut tx, class_id, name).await?);
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a student joined with class, semester, workshops, and points.
    pub async fn find_summary(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<StudentSummary>, sqlx::Error> {
        let query = format!("{SUMMARY_SELECT} WHERE s.id = $1");
        sqlx::query_as::<_, StudentSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List students by name.
    ///
    /// Students of inactive semesters are hidden unless `include_inactive` is set.
    pub async fn list(
        pool: &PgPool,
        filter: &StudentFilter,
    ) -> Result<Vec<StudentSummary>, sqlx::Error> {
        let query = format!(
            "{SUMMARY_SELECT}
             WHERE ($1::TEXT IS NULL OR s.name ILIKE $1)
               AND ($2::BIGINT IS NULL OR s.class_id = $2)
               AND ($3 OR se.is_active)
             ORDER BY s.name, s.id"
        );
        sqlx::query_as::<_, StudentSummary>(&query)
            .bind(like_pattern(filter.q.as_deref()))
            .bind(filter.class_id)
            .bind(filter.include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a student. `workshop_ids`, when present, replaces the fixed set.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStudent,
    ) -> RepoResult<Option<Student>> {
        let mut tx = pool.begin().await?;
        if let Some(class_id) = input.class_id {
            ensure_class_in_active_semester(&mut tx, class_id).await?;
        }

        let query = format!(
            "UPDATE students SET
                class_id = COALESCE($2, class_id),
                name = COALESCE($3, name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(student) = sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(input.class_id)
            .bind(input.name.as_deref().map(str::trim))
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(workshop_ids) = &input.workshop_ids {
            Self::set_workshops_inner(&mut tx, id, workshop_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(student))
    }

    /// Delete a student. Their allocations and enrollments cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A student's allocations on non-cancelled events, most recent first.
    pub async fn list_allocations(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<StudentAllocation>, sqlx::Error> {
        sqlx::query_as::<_, StudentAllocation>(
            "SELECT a.id AS allocation_id, e.id AS event_id, e.title, e.kind_id,
                    e.starts_at, e.ends_at, e.weight, a.status_id
             FROM allocations a
             JOIN events e ON e.id = a.event_id
             WHERE a.student_id = $1 AND NOT e.is_cancelled
             ORDER BY e.starts_at DESC, a.id",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    /// Students who may still be allocated to an event.
    ///
    /// Only active-semester students without an allocation on the event are
    /// returned. When the event is linked to workshops, only students with a
    /// fixed enrollment in one of them qualify.
    pub async fn eligible_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EligibleStudent>, sqlx::Error> {
        let query = format!(
            "SELECT s.id, s.name, c.id AS class_id, c.name AS class_name, se.name AS semester_name
             FROM students s
             JOIN classes c ON c.id = s.class_id
             JOIN semesters se ON se.id = c.semester_id
             WHERE se.is_active
               AND NOT EXISTS (
                   SELECT 1 FROM allocations a WHERE a.event_id = $1 AND a.student_id = s.id
               )
               AND {IN_EVENT_WORKSHOPS}
             ORDER BY se.name DESC, c.name, s.name, s.id"
        );
        sqlx::query_as::<_, EligibleStudent>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    async fn insert_inner(
        tx: &mut PgTx<'_>,
        class_id: DbId,
        name: &str,
    ) -> Result<Student, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (class_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(class_id)
            .bind(name.trim())
            .fetch_one(&mut **tx)
            .await
    }

    /// Replace fixed workshop enrollment within an existing transaction.
    async fn set_workshops_inner(
        tx: &mut PgTx<'_>,
        student_id: DbId,
        workshop_ids: &[DbId],
    ) -> RepoResult<()> {
        let workshop_ids = ensure_workshops_exist(tx, workshop_ids).await?;

        sqlx::query("DELETE FROM student_workshops WHERE student_id = $1")
            .bind(student_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO student_workshops (student_id, workshop_id)
             SELECT $1, unnest($2::BIGINT[])",
        )
        .bind(student_id)
        .bind(&workshop_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
