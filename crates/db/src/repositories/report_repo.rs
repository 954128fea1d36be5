//! Read-only attendance reports.
//!
//! Allocations on cancelled events never count. Percentages are filled in
//! with [`AttendanceCounts::with_percentage`] after each fetch.

use rollcall_core::reporting::DASHBOARD_UPCOMING_EVENTS;
use rollcall_core::types::{DbId, StatusId, Timestamp};
use sqlx::PgPool;

use crate::models::report::{
    AttendanceCounts, ClassReport, ClassReportRow, Dashboard, DashboardCounts, EventReportRow,
    KindCount, LeaderboardEntry, OverviewReport, StudentReport,
};
use crate::repositories::{EventRepo, StudentRepo};

/// Per-status counts and points over `allocations a JOIN events e`.
const COUNTS: &str = "COUNT(a.id) FILTER (WHERE a.status_id = 1) AS planned,
        COUNT(a.id) FILTER (WHERE a.status_id = 2) AS present,
        COUNT(a.id) FILTER (WHERE a.status_id = 3) AS absent,
        COUNT(a.id) FILTER (WHERE a.status_id = 4) AS excused,
        COALESCE(SUM(e.weight) FILTER (WHERE a.status_id = 2), 0)::BIGINT AS points";

/// Provides the dashboard and the attendance reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Headline counts plus the next few events after `now`.
    pub async fn dashboard(pool: &PgPool, now: Timestamp) -> Result<Dashboard, sqlx::Error> {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            "SELECT
                (SELECT COUNT(*) FROM classes c
                 JOIN semesters s ON s.id = c.semester_id
                 WHERE s.is_active) AS class_count,
                (SELECT COUNT(*) FROM workshops) AS workshop_count,
                (SELECT COUNT(*) FROM students st
                 JOIN classes c ON c.id = st.class_id
                 JOIN semesters s ON s.id = c.semester_id
                 WHERE s.is_active) AS student_count,
                (SELECT COUNT(*) FROM events WHERE NOT is_cancelled) AS event_count",
        )
        .fetch_one(pool)
        .await?;

        let upcoming_events = EventRepo::upcoming(pool, now, DASHBOARD_UPCOMING_EVENTS).await?;

        Ok(Dashboard {
            counts,
            upcoming_events,
        })
    }

    /// System-wide totals, events per kind, and the points leaderboard.
    ///
    /// Student, allocation, and attendance totals only cover students of
    /// active semesters. The leaderboard ranks the same students; ties are
    /// broken by name, then id.
    pub async fn overview(pool: &PgPool, leaderboard_size: i64) -> Result<OverviewReport, sqlx::Error> {
        let (student_count, event_count, allocation_count): (i64, i64, i64) = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM students st
                 JOIN classes c ON c.id = st.class_id
                 JOIN semesters s ON s.id = c.semester_id
                 WHERE s.is_active),
                (SELECT COUNT(*) FROM events WHERE NOT is_cancelled),
                (SELECT COUNT(*) FROM allocations a
                 JOIN events e ON e.id = a.event_id
                 JOIN students st ON st.id = a.student_id
                 JOIN classes c ON c.id = st.class_id
                 JOIN semesters s ON s.id = c.semester_id
                 WHERE NOT e.is_cancelled AND s.is_active)",
        )
        .fetch_one(pool)
        .await?;

        let attendance_query = format!(
            "SELECT {COUNTS}
             FROM allocations a
             JOIN events e ON e.id = a.event_id
             JOIN students st ON st.id = a.student_id
             JOIN classes c ON c.id = st.class_id
             JOIN semesters s ON s.id = c.semester_id
             WHERE NOT e.is_cancelled AND s.is_active"
        );
        let attendance = sqlx::query_as::<_, AttendanceCounts>(&attendance_query)
            .fetch_one(pool)
            .await?
            .with_percentage();

        let events_by_kind = sqlx::query_as::<_, KindCount>(
            "SELECT k.id AS kind_id, COUNT(e.id) AS event_count
             FROM event_kinds k
             LEFT JOIN events e ON e.kind_id = k.id AND NOT e.is_cancelled
             GROUP BY k.id
             ORDER BY k.id",
        )
        .fetch_all(pool)
        .await?;

        let leaderboard = sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT st.id AS student_id, st.name, c.name AS class_name,
                    COALESCE(SUM(e.weight) FILTER (WHERE a.status_id = 2), 0)::BIGINT AS points
             FROM students st
             JOIN classes c ON c.id = st.class_id
             JOIN semesters s ON s.id = c.semester_id
             LEFT JOIN (allocations a JOIN events e ON e.id = a.event_id AND NOT e.is_cancelled)
                    ON a.student_id = st.id
             WHERE s.is_active
             GROUP BY st.id, st.name, c.name
             ORDER BY points DESC, st.name, st.id
             LIMIT $1",
        )
        .bind(leaderboard_size)
        .fetch_all(pool)
        .await?;

        Ok(OverviewReport {
            student_count,
            event_count,
            allocation_count,
            attendance,
            events_by_kind,
            leaderboard,
        })
    }

    /// One row per student of the class. Returns `None` if the class is missing.
    pub async fn class_report(pool: &PgPool, class_id: DbId) -> Result<Option<ClassReport>, sqlx::Error> {
        let header: Option<(DbId, String, String)> = sqlx::query_as(
            "SELECT c.id, c.name, s.name
             FROM classes c JOIN semesters s ON s.id = c.semester_id
             WHERE c.id = $1",
        )
        .bind(class_id)
        .fetch_optional(pool)
        .await?;
        let Some((class_id, class_name, semester_name)) = header else {
            return Ok(None);
        };

        let query = format!(
            "SELECT st.id AS student_id, st.name, {COUNTS}
             FROM students st
             LEFT JOIN (allocations a JOIN events e ON e.id = a.event_id AND NOT e.is_cancelled)
                    ON a.student_id = st.id
             WHERE st.class_id = $1
             GROUP BY st.id, st.name
             ORDER BY st.name, st.id"
        );
        let students = sqlx::query_as::<_, ClassReportRow>(&query)
            .bind(class_id)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|mut row| {
                row.attendance = row.attendance.with_percentage();
                row
            })
            .collect();

        Ok(Some(ClassReport {
            class_id,
            class_name,
            semester_name,
            students,
        }))
    }

    /// One row per non-cancelled event, most recent first, optionally of one kind.
    pub async fn event_report(
        pool: &PgPool,
        kind_id: Option<StatusId>,
    ) -> Result<Vec<EventReportRow>, sqlx::Error> {
        let query = format!(
            "SELECT e.id AS event_id, e.title, e.kind_id, e.starts_at,
                    COUNT(a.id) AS allocated, {COUNTS}
             FROM events e
             LEFT JOIN allocations a ON a.event_id = e.id
             WHERE NOT e.is_cancelled
               AND ($1::SMALLINT IS NULL OR e.kind_id = $1)
             GROUP BY e.id
             ORDER BY e.starts_at DESC, e.id"
        );
        let rows = sqlx::query_as::<_, EventReportRow>(&query)
            .bind(kind_id)
            .fetch_all(pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|mut row| {
                row.attendance = row.attendance.with_percentage();
                row
            })
            .collect())
    }

    /// A student's totals and allocation history. Returns `None` if the student is missing.
    pub async fn student_report(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Option<StudentReport>, sqlx::Error> {
        let Some(student) = StudentRepo::find_summary(pool, student_id).await? else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {COUNTS}
             FROM allocations a
             JOIN events e ON e.id = a.event_id
             WHERE a.student_id = $1 AND NOT e.is_cancelled"
        );
        let attendance = sqlx::query_as::<_, AttendanceCounts>(&query)
            .bind(student_id)
            .fetch_one(pool)
            .await?
            .with_percentage();

        let allocations = StudentRepo::list_allocations(pool, student_id).await?;

        Ok(Some(StudentReport {
            student,
            attendance,
            allocations,
        }))
    }
}
