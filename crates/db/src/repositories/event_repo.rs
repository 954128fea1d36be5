//! Repository for the `events` table and event-workshop links.

use rollcall_core::attendance::{AttendanceStatus, BLOCKING_STATUS_IDS};
use rollcall_core::conflict::{check_conflicts, CandidateSlot, TimeWindow};
use rollcall_core::error::CoreError;
use rollcall_core::types::{DbId, StatusId, Timestamp};
use sqlx::PgPool;

use crate::error::RepoResult;
use crate::models::event::{CreateEvent, Event, EventFilter, EventSummary, UpdateEvent};
use crate::repositories::allocation_repo::lock_student;
use crate::repositories::checks::{ensure_workshops_exist, like_pattern, PgTx};
use crate::repositories::AllocationRepo;

/// Column list shared across queries. Expects the `events` table aliased as `e`.
const COLUMNS: &str = "e.id, e.title, e.kind_id, e.starts_at, e.ends_at, e.location,
        e.weight, e.is_cancelled,
        COALESCE(
            (SELECT array_agg(ew.workshop_id ORDER BY ew.workshop_id)
             FROM event_workshops ew WHERE ew.event_id = e.id),
            '{}'::BIGINT[]
        ) AS workshop_ids,
        COALESCE(
            (SELECT array_agg(w.default_location::TEXT ORDER BY w.name, w.id)
             FROM event_workshops ew JOIN workshops w ON w.id = ew.workshop_id
             WHERE ew.event_id = e.id),
            '{}'::TEXT[]
        ) AS workshop_locations,
        e.created_at, e.updated_at";

/// Provides event creation (single or series), edits, and calendar queries.
pub struct EventRepo;

impl EventRepo {
    /// Insert one event per window, all sharing the other attributes of `input`.
    ///
    /// The whole series is written in one transaction.
    pub async fn create_series(
        pool: &PgPool,
        input: &CreateEvent,
        windows: &[TimeWindow],
    ) -> RepoResult<Vec<Event>> {
        if windows.is_empty() {
            return Err(CoreError::Validation("No occurrences to create".to_string()).into());
        }

        let mut tx = pool.begin().await?;
        let workshop_ids =
            ensure_workshops_exist(&mut tx, input.workshop_ids.as_deref().unwrap_or_default())
                .await?;
        let location = input
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());

        let mut ids = Vec::with_capacity(windows.len());
        for window in windows {
            let id: DbId = sqlx::query_scalar(
                "INSERT INTO events (title, kind_id, starts_at, ends_at, location, weight)
                 VALUES ($1, $2, $3, $4, $5, COALESCE($6, 1))
                 RETURNING id",
            )
            .bind(input.title.trim())
            .bind(input.kind_id)
            .bind(window.starts_at)
            .bind(window.ends_at)
            .bind(location)
            .bind(input.weight)
            .fetch_one(&mut *tx)
            .await?;

            Self::link_workshops_inner(&mut tx, id, &workshop_ids).await?;
            ids.push(id);
        }

        tx.commit().await?;
        Ok(Self::list_by_ids(pool, &ids).await?)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events e WHERE e.id = $1");
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(event.map(resolved))
    }

    /// Events with the given IDs, ordered by start.
    pub async fn list_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Event>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM events e WHERE e.id = ANY($1) ORDER BY e.starts_at, e.id");
        let events = sqlx::query_as::<_, Event>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(events.into_iter().map(resolved).collect())
    }

    /// List events by start time with allocation counts.
    pub async fn list(pool: &PgPool, filter: &EventFilter) -> Result<Vec<EventSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS},
                    (SELECT COUNT(*) FROM allocations a WHERE a.event_id = e.id) AS allocation_count,
                    (SELECT COUNT(*) FROM allocations a
                     WHERE a.event_id = e.id AND a.status_id = 2) AS present_count
             FROM events e
             WHERE ($1::TEXT IS NULL OR e.title ILIKE $1)
               AND ($2::SMALLINT IS NULL OR e.kind_id = $2)
             ORDER BY e.starts_at, e.id"
        );
        let mut rows = sqlx::query_as::<_, EventSummary>(&query)
            .bind(like_pattern(filter.q.as_deref()))
            .bind(filter.kind_id)
            .fetch_all(pool)
            .await?;
        for row in &mut rows {
            row.event.resolve_location();
        }
        Ok(rows)
    }

    /// Edit a single event. Only non-`None` fields in `input` are applied.
    ///
    /// When the time window moves, every blocking allocation on the event is
    /// re-checked against its student's other allocations; any clash rejects
    /// the edit with [`CoreError::ScheduleConflict`].
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(pool: &PgPool, id: DbId, input: &UpdateEvent) -> RepoResult<Option<Event>> {
        let mut tx = pool.begin().await?;

        let current: Option<(Timestamp, Timestamp)> =
            sqlx::query_as("SELECT starts_at, ends_at FROM events WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((starts_at, ends_at)) = current else {
            return Ok(None);
        };

        let window = TimeWindow::new(
            input.starts_at.unwrap_or(starts_at),
            input.ends_at.unwrap_or(ends_at),
        )?;
        if window.starts_at != starts_at || window.ends_at != ends_at {
            Self::recheck_allocations_inner(&mut tx, id, window).await?;
        }

        if let Some(workshop_ids) = &input.workshop_ids {
            let workshop_ids = ensure_workshops_exist(&mut tx, workshop_ids).await?;
            sqlx::query("DELETE FROM event_workshops WHERE event_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            Self::link_workshops_inner(&mut tx, id, &workshop_ids).await?;
        }

        sqlx::query(
            "UPDATE events SET
                title = COALESCE($2, title),
                kind_id = COALESCE($3, kind_id),
                starts_at = $4,
                ends_at = $5,
                location = CASE WHEN $6::TEXT IS NULL THEN location ELSE NULLIF(TRIM($6), '') END,
                weight = COALESCE($7, weight)
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.title.as_deref().map(str::trim))
        .bind(input.kind_id)
        .bind(window.starts_at)
        .bind(window.ends_at)
        .bind(input.location.as_deref())
        .bind(input.weight)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Self::find_by_id(pool, id).await?)
    }

    /// Delete an event. Its allocations and workshop links cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the cancelled flag. Returns the updated event, or `None` if missing.
    pub async fn toggle_cancelled(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let result = sqlx::query("UPDATE events SET is_cancelled = NOT is_cancelled WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Non-cancelled events starting at or after `start` and ending at or before `end`.
    pub async fn calendar(
        pool: &PgPool,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events e
             WHERE NOT e.is_cancelled
               AND ($1::TIMESTAMPTZ IS NULL OR e.starts_at >= $1)
               AND ($2::TIMESTAMPTZ IS NULL OR e.ends_at <= $2)
             ORDER BY e.starts_at, e.id"
        );
        let events = sqlx::query_as::<_, Event>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?;
        Ok(events.into_iter().map(resolved).collect())
    }

    /// The next `limit` non-cancelled events starting at or after `from`.
    pub async fn upcoming(
        pool: &PgPool,
        from: Timestamp,
        limit: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events e
             WHERE NOT e.is_cancelled AND e.starts_at >= $1
             ORDER BY e.starts_at, e.id
             LIMIT $2"
        );
        let events = sqlx::query_as::<_, Event>(&query)
            .bind(from)
            .bind(limit)
            .fetch_all(pool)
            .await?;
        Ok(events.into_iter().map(resolved).collect())
    }

    async fn link_workshops_inner(
        tx: &mut PgTx<'_>,
        event_id: DbId,
        workshop_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        if workshop_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO event_workshops (event_id, workshop_id)
             SELECT $1, unnest($2::BIGINT[])",
        )
        .bind(event_id)
        .bind(workshop_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Re-run the conflict check for every blocking allocation of an event
    /// as if the event already had `window`.
    async fn recheck_allocations_inner(
        tx: &mut PgTx<'_>,
        event_id: DbId,
        window: TimeWindow,
    ) -> RepoResult<()> {
        let rows: Vec<(DbId, DbId, StatusId)> = sqlx::query_as(
            "SELECT id, student_id, status_id FROM allocations
             WHERE event_id = $1 AND status_id = ANY($2)
             ORDER BY student_id",
        )
        .bind(event_id)
        .bind(&BLOCKING_STATUS_IDS[..])
        .fetch_all(&mut **tx)
        .await?;

        for (allocation_id, student_id, status_id) in rows {
            let Some(status) = AttendanceStatus::from_id(status_id) else {
                continue;
            };
            lock_student(tx, student_id).await?;
            let booked = AllocationRepo::booked_slots_inner(tx, student_id).await?;
            let candidate = CandidateSlot {
                allocation_id: Some(allocation_id),
                status,
                window,
            };
            check_conflicts(&candidate, &booked).map_err(CoreError::from)?;
        }
        Ok(())
    }
}

fn resolved(mut event: Event) -> Event {
    event.resolve_location();
    event
}
