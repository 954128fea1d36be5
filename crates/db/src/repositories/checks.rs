//! Precondition checks shared by transactional writes.

use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;

use crate::error::RepoResult;

pub(crate) type PgTx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// SQL predicate: student `s` may join event `$1` by workshop membership.
///
/// Events without workshops are open to everyone. Otherwise the student
/// needs a fixed enrollment in at least one of the event's workshops.
pub(crate) const IN_EVENT_WORKSHOPS: &str = "(
        NOT EXISTS (SELECT 1 FROM event_workshops ew WHERE ew.event_id = $1)
        OR EXISTS (
            SELECT 1
            FROM student_workshops sw
            JOIN event_workshops ew ON ew.workshop_id = sw.workshop_id
            WHERE ew.event_id = $1 AND sw.student_id = s.id
        )
    )";

/// Sorted, de-duplicated copy of `ids`.
pub(crate) fn dedup_ids(ids: &[DbId]) -> Vec<DbId> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Turn a free-text search into an `ILIKE` pattern, escaping wildcards.
pub(crate) fn like_pattern(q: Option<&str>) -> Option<String> {
    let q = q.map(str::trim).filter(|q| !q.is_empty())?;
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

/// Fail unless the semester exists and is active.
pub(crate) async fn ensure_active_semester(tx: &mut PgTx<'_>, semester_id: DbId) -> RepoResult<()> {
    let active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM semesters WHERE id = $1")
        .bind(semester_id)
        .fetch_optional(&mut **tx)
        .await?;
    match active {
        Some(true) => Ok(()),
        Some(false) => Err(CoreError::Validation(format!(
            "Semester {semester_id} is not active"
        ))
        .into()),
        None => Err(CoreError::NotFound {
            entity: "Semester",
            id: semester_id,
        }
        .into()),
    }
}

/// Fail unless the class exists and belongs to an active semester.
pub(crate) async fn ensure_class_in_active_semester(
    tx: &mut PgTx<'_>,
    class_id: DbId,
) -> RepoResult<()> {
    let active: Option<bool> = sqlx::query_scalar(
        "SELECT s.is_active FROM classes c JOIN semesters s ON s.id = c.semester_id WHERE c.id = $1",
    )
    .bind(class_id)
    .fetch_optional(&mut **tx)
    .await?;
    match active {
        Some(true) => Ok(()),
        Some(false) => Err(CoreError::Validation(format!(
            "Class {class_id} belongs to an inactive semester"
        ))
        .into()),
        None => Err(CoreError::NotFound {
            entity: "Class",
            id: class_id,
        }
        .into()),
    }
}

/// Fail unless every workshop ID exists. Returns the de-duplicated IDs.
pub(crate) async fn ensure_workshops_exist(
    tx: &mut PgTx<'_>,
    workshop_ids: &[DbId],
) -> RepoResult<Vec<DbId>> {
    let wanted = dedup_ids(workshop_ids);
    if wanted.is_empty() {
        return Ok(wanted);
    }
    let found: Vec<DbId> =
        sqlx::query_scalar("SELECT id FROM workshops WHERE id = ANY($1) ORDER BY id")
            .bind(&wanted)
            .fetch_all(&mut **tx)
            .await?;
    reject_missing("workshop", &wanted, &found)?;
    Ok(wanted)
}

/// Fail unless every student exists and is in an active semester.
pub(crate) async fn ensure_active_students(
    tx: &mut PgTx<'_>,
    student_ids: &[DbId],
) -> RepoResult<Vec<DbId>> {
    let wanted = dedup_ids(student_ids);
    if wanted.is_empty() {
        return Ok(wanted);
    }
    let found: Vec<DbId> = sqlx::query_scalar(
        "SELECT s.id FROM students s
         JOIN classes c ON c.id = s.class_id
         JOIN semesters se ON se.id = c.semester_id
         WHERE s.id = ANY($1) AND se.is_active
         ORDER BY s.id",
    )
    .bind(&wanted)
    .fetch_all(&mut **tx)
    .await?;
    reject_missing("active-semester student", &wanted, &found)?;
    Ok(wanted)
}

fn reject_missing(what: &str, wanted: &[DbId], found: &[DbId]) -> RepoResult<()> {
    let missing: Vec<String> = wanted
        .iter()
        .filter(|id| !found.contains(id))
        .map(ToString::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("Unknown {what} ids: {}", missing.join(", "))).into())
    }
}
