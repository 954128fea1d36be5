//! Repository for the `allocations` table.
//!
//! Every write that can put a student into a blocking status runs the
//! schedule conflict check in the same transaction. Lock order is always
//! event row first, then student row, so concurrent writes for the same
//! student serialize without deadlocking against event edits.

use std::collections::{HashMap, HashSet};

use rollcall_core::attendance::{
    mark_roll_call, AttendanceStatus, RollCallEntry, BLOCKING_STATUS_IDS,
};
use rollcall_core::conflict::{check_conflicts, BookedSlot, CandidateSlot, TimeWindow};
use rollcall_core::error::CoreError;
use rollcall_core::types::{DbId, StatusId, Timestamp};
use sqlx::PgPool;

use crate::error::{RepoError, RepoResult};
use crate::models::allocation::{
    Allocation, AllocationDetail, BulkAllocationFailure, BulkAllocationResult, ConflictCheck,
    CreateAllocation, RollCallResult,
};
use crate::repositories::checks::{PgTx, IN_EVENT_WORKSHOPS};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, event_id, student_id, status_id, created_at, updated_at";

const DETAIL_SELECT: &str = "SELECT a.id, a.event_id, a.student_id, s.name AS student_name,
        c.name AS class_name, a.status_id, a.created_at, a.updated_at
     FROM allocations a
     JOIN students s ON s.id = a.student_id
     JOIN classes c ON c.id = s.class_id";

const ALREADY_ALLOCATED: &str = "Student is already allocated to this event";
const NOT_IN_ACTIVE_SEMESTER: &str = "Student does not belong to an active semester";
const NOT_IN_EVENT_WORKSHOPS: &str = "Student is not enrolled in any of this event's workshops";

/// Provides allocation writes (conflict-checked), listings, and roll call.
pub struct AllocationRepo;

impl AllocationRepo {
    /// Allocate a student to an event.
    ///
    /// Defaults to Planned. Fails with [`CoreError::Conflict`] if the student is
    /// already on the event, and with [`CoreError::ScheduleConflict`] when the
    /// student holds a blocking allocation in an overlapping window.
    pub async fn create(
        pool: &PgPool,
        event_id: DbId,
        input: &CreateAllocation,
    ) -> RepoResult<Allocation> {
        let status = match input.status_id {
            Some(id) => parse_status(id)?,
            None => AttendanceStatus::Planned,
        };

        let mut tx = pool.begin().await?;
        let window = lock_event(&mut tx, event_id).await?;
        lock_student(&mut tx, input.student_id).await?;

        let existing: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM allocations WHERE event_id = $1 AND student_id = $2",
        )
        .bind(event_id)
        .bind(input.student_id)
        .fetch_optional(&mut *tx)
        .await?;
        if existing.is_some() {
            return Err(CoreError::Conflict(ALREADY_ALLOCATED.to_string()).into());
        }

        let candidate = CandidateSlot {
            allocation_id: None,
            status,
            window,
        };
        let booked = Self::booked_slots_inner(&mut tx, input.student_id).await?;
        check_conflicts(&candidate, &booked).map_err(CoreError::from)?;

        let query = format!(
            "INSERT INTO allocations (event_id, student_id, status_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let allocation = sqlx::query_as::<_, Allocation>(&query)
            .bind(event_id)
            .bind(input.student_id)
            .bind(status.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(allocation)
    }

    /// Change an allocation's status.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: AttendanceStatus,
        check: ConflictCheck,
    ) -> RepoResult<Option<Allocation>> {
        let mut tx = pool.begin().await?;
        let allocation = Self::set_status_inner(&mut tx, id, status, check).await?;
        tx.commit().await?;
        Ok(allocation)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Allocation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM allocations WHERE id = $1");
        sqlx::query_as::<_, Allocation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All allocations of an event, by student name.
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<AllocationDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE a.event_id = $1 ORDER BY s.name, a.id");
        sqlx::query_as::<_, AllocationDetail>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Planned and present allocations of an event, for its public summary.
    pub async fn list_attendees(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<AllocationDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} WHERE a.event_id = $1 AND a.status_id = ANY($2) ORDER BY s.name, a.id"
        );
        sqlx::query_as::<_, AllocationDetail>(&query)
            .bind(event_id)
            .bind(&BLOCKING_STATUS_IDS[..])
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM allocations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Allocate many students as Planned, one transaction per student.
    ///
    /// Only students who could be picked for the event are allocated: they
    /// must belong to an active semester and, when the event has workshops,
    /// hold a fixed enrollment in one of them. Students that fail (ineligible,
    /// conflict, duplicate, unknown) are reported next to the successes
    /// instead of aborting the batch. Connection-level database errors still
    /// abort.
    pub async fn bulk_allocate(
        pool: &PgPool,
        event_id: DbId,
        student_ids: &[DbId],
    ) -> RepoResult<BulkAllocationResult> {
        let exists: Option<DbId> = sqlx::query_scalar("SELECT id FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            return Err(CoreError::NotFound {
                entity: "Event",
                id: event_id,
            }
            .into());
        }

        let eligibility = Self::eligibility(pool, event_id, student_ids).await?;

        let mut seen = HashSet::new();
        let mut result = BulkAllocationResult::default();

        for &student_id in student_ids.iter().filter(|id| seen.insert(**id)) {
            let reason = match eligibility.get(&student_id) {
                Some((false, _)) => Some(NOT_IN_ACTIVE_SEMESTER),
                Some((true, false)) => Some(NOT_IN_EVENT_WORKSHOPS),
                _ => None,
            };
            if let Some(reason) = reason {
                result.failed.push(BulkAllocationFailure {
                    student_id,
                    error: reason.to_string(),
                });
                continue;
            }

            let input = CreateAllocation {
                student_id,
                status_id: None,
            };
            match Self::create(pool, event_id, &input).await {
                Ok(allocation) => result.created.push(allocation),
                Err(RepoError::Core(err)) => result.failed.push(BulkAllocationFailure {
                    student_id,
                    error: err.to_string(),
                }),
                Err(RepoError::Database(sqlx::Error::Database(db_err)))
                    if db_err.code().as_deref() == Some("23505") =>
                {
                    result.failed.push(BulkAllocationFailure {
                        student_id,
                        error: ALREADY_ALLOCATED.to_string(),
                    })
                }
                Err(other) => return Err(other),
            }
        }

        Ok(result)
    }

    /// Per requested student: (in an active semester, in the event's workshops).
    ///
    /// Unknown student IDs are absent from the map.
    async fn eligibility(
        pool: &PgPool,
        event_id: DbId,
        student_ids: &[DbId],
    ) -> Result<HashMap<DbId, (bool, bool)>, sqlx::Error> {
        let query = format!(
            "SELECT s.id, se.is_active, {IN_EVENT_WORKSHOPS} AS in_workshops
             FROM students s
             JOIN classes c ON c.id = s.class_id
             JOIN semesters se ON se.id = c.semester_id
             WHERE s.id = ANY($2)"
        );
        let rows: Vec<(DbId, bool, bool)> = sqlx::query_as(&query)
            .bind(event_id)
            .bind(student_ids)
            .fetch_all(pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, active, in_workshops)| (id, (active, in_workshops)))
            .collect())
    }

    /// Record who attended an event.
    ///
    /// Every non-excused allocation becomes Present if its student is listed,
    /// Absent otherwise. Status flips from roll call cannot create new
    /// overlaps, so the conflict check is skipped.
    pub async fn roll_call(
        pool: &PgPool,
        event_id: DbId,
        present_student_ids: &[DbId],
    ) -> RepoResult<RollCallResult> {
        let mut tx = pool.begin().await?;

        let cancelled: Option<bool> =
            sqlx::query_scalar("SELECT is_cancelled FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
        match cancelled {
            None => {
                return Err(CoreError::NotFound {
                    entity: "Event",
                    id: event_id,
                }
                .into())
            }
            Some(true) => {
                return Err(CoreError::Validation(
                    "Cannot take roll call for a cancelled event".to_string(),
                )
                .into())
            }
            Some(false) => {}
        }

        let rows: Vec<(DbId, DbId, StatusId)> = sqlx::query_as(
            "SELECT id, student_id, status_id FROM allocations WHERE event_id = $1 ORDER BY id",
        )
        .bind(event_id)
        .fetch_all(&mut *tx)
        .await?;

        let entries: Vec<RollCallEntry> = rows
            .into_iter()
            .filter_map(|(allocation_id, student_id, status_id)| {
                AttendanceStatus::from_id(status_id).map(|status| RollCallEntry {
                    allocation_id,
                    student_id,
                    status,
                })
            })
            .collect();

        let present: HashSet<DbId> = present_student_ids.iter().copied().collect();
        let callable: HashSet<DbId> = entries
            .iter()
            .filter(|e| e.status != AttendanceStatus::Excused)
            .map(|e| e.student_id)
            .collect();
        let mut unknown: Vec<DbId> = present.difference(&callable).copied().collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            let ids: Vec<String> = unknown.iter().map(ToString::to_string).collect();
            return Err(CoreError::Validation(format!(
                "Students not on this event's roll: {}",
                ids.join(", ")
            ))
            .into());
        }

        let mut result = RollCallResult {
            present: 0,
            absent: 0,
        };
        for mark in mark_roll_call(&entries, &present) {
            Self::set_status_inner(&mut tx, mark.allocation_id, mark.status, ConflictCheck::Skip)
                .await?;
            match mark.status {
                AttendanceStatus::Present => result.present += 1,
                _ => result.absent += 1,
            }
        }

        tx.commit().await?;
        Ok(result)
    }

    /// Blocking allocations held by a student, joined with their event windows.
    pub(crate) async fn booked_slots_inner(
        tx: &mut PgTx<'_>,
        student_id: DbId,
    ) -> RepoResult<Vec<BookedSlot>> {
        let rows: Vec<(DbId, StatusId, String, Timestamp, Timestamp)> = sqlx::query_as(
            "SELECT a.id, a.status_id, e.title, e.starts_at, e.ends_at
             FROM allocations a
             JOIN events e ON e.id = a.event_id
             WHERE a.student_id = $1 AND a.status_id = ANY($2)",
        )
        .bind(student_id)
        .bind(&BLOCKING_STATUS_IDS[..])
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(allocation_id, status_id, event_title, starts_at, ends_at)| {
                AttendanceStatus::from_id(status_id).map(|status| BookedSlot {
                    allocation_id,
                    status,
                    event_title,
                    window: TimeWindow { starts_at, ends_at },
                })
            })
            .collect())
    }

    /// Change a status within an existing transaction.
    async fn set_status_inner(
        tx: &mut PgTx<'_>,
        id: DbId,
        status: AttendanceStatus,
        check: ConflictCheck,
    ) -> RepoResult<Option<Allocation>> {
        let current: Option<(DbId, DbId)> =
            sqlx::query_as("SELECT event_id, student_id FROM allocations WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        let Some((event_id, student_id)) = current else {
            return Ok(None);
        };

        if check == ConflictCheck::Enforce && status.is_blocking() {
            let window = lock_event(tx, event_id).await?;
            lock_student(tx, student_id).await?;
            let candidate = CandidateSlot {
                allocation_id: Some(id),
                status,
                window,
            };
            let booked = Self::booked_slots_inner(tx, student_id).await?;
            check_conflicts(&candidate, &booked).map_err(CoreError::from)?;
        }

        let query = format!(
            "UPDATE allocations SET status_id = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Allocation>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_optional(&mut **tx)
            .await?)
    }
}

fn parse_status(id: StatusId) -> RepoResult<AttendanceStatus> {
    AttendanceStatus::from_id(id)
        .ok_or_else(|| CoreError::Validation(format!("Unknown attendance status {id}")).into())
}

/// Share-lock the event row and return its window.
async fn lock_event(tx: &mut PgTx<'_>, event_id: DbId) -> RepoResult<TimeWindow> {
    let row: Option<(Timestamp, Timestamp)> =
        sqlx::query_as("SELECT starts_at, ends_at FROM events WHERE id = $1 FOR SHARE")
            .bind(event_id)
            .fetch_optional(&mut **tx)
            .await?;
    let (starts_at, ends_at) = row.ok_or(CoreError::NotFound {
        entity: "Event",
        id: event_id,
    })?;
    Ok(TimeWindow { starts_at, ends_at })
}

/// Lock the student row so conflict checks for the same student serialize.
pub(crate) async fn lock_student(tx: &mut PgTx<'_>, student_id: DbId) -> RepoResult<()> {
    let found: Option<DbId> = sqlx::query_scalar("SELECT id FROM students WHERE id = $1 FOR UPDATE")
        .bind(student_id)
        .fetch_optional(&mut **tx)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(CoreError::NotFound {
            entity: "Student",
            id: student_id,
        }
        .into()),
    }
}
