//! Read-only report rows.

use rollcall_core::reporting::attendance_percentage;
use rollcall_core::types::{DbId, StatusId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::event::Event;
use crate::models::student::{StudentAllocation, StudentSummary};

/// Allocation counts by status plus earned points.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct AttendanceCounts {
    pub planned: i64,
    pub present: i64,
    pub absent: i64,
    pub excused: i64,
    pub points: i64,
    #[sqlx(skip)]
    pub percentage: i64,
}

impl AttendanceCounts {
    /// Fill [`AttendanceCounts::percentage`] from present and absent.
    pub fn with_percentage(mut self) -> Self {
        self.percentage = attendance_percentage(self.present, self.absent);
        self
    }
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardCounts {
    pub class_count: i64,
    pub workshop_count: i64,
    pub student_count: i64,
    pub event_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub counts: DashboardCounts,
    pub upcoming_events: Vec<Event>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KindCount {
    pub kind_id: StatusId,
    pub event_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardEntry {
    pub student_id: DbId,
    pub name: String,
    pub class_name: String,
    pub points: i64,
}

/// System-wide attendance overview.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewReport {
    pub student_count: i64,
    pub event_count: i64,
    pub allocation_count: i64,
    pub attendance: AttendanceCounts,
    pub events_by_kind: Vec<KindCount>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// One student's line in a class report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassReportRow {
    pub student_id: DbId,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attendance: AttendanceCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub class_id: DbId,
    pub class_name: String,
    pub semester_name: String,
    pub students: Vec<ClassReportRow>,
}

/// One event's line in the event report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventReportRow {
    pub event_id: DbId,
    pub title: String,
    pub kind_id: StatusId,
    pub starts_at: Timestamp,
    pub allocated: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attendance: AttendanceCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentReport {
    pub student: StudentSummary,
    pub attendance: AttendanceCounts,
    pub allocations: Vec<StudentAllocation>,
}
