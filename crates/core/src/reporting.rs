//! Attendance arithmetic shared by every report.
//!
//! Only Present and Absent count towards a percentage. Planned allocations
//! have not happened yet and Excused ones were waived, so both are left out
//! of the numerator and the denominator.

/// Number of students shown on the leaderboard when no limit is given.
pub const DEFAULT_LEADERBOARD_SIZE: i64 = 10;

/// Largest leaderboard a caller may request.
pub const MAX_LEADERBOARD_SIZE: i64 = 100;

/// Upcoming events listed on the dashboard.
pub const DASHBOARD_UPCOMING_EVENTS: i64 = 5;

/// Percentage of attended sessions, rounded half up. Zero when nothing was recorded.
pub fn attendance_percentage(present: i64, absent: i64) -> i64 {
    let present = present.max(0);
    let recorded = present + absent.max(0);
    if recorded == 0 {
        return 0;
    }
    (200 * present + recorded) / (2 * recorded)
}

/// Clamp a requested leaderboard size to `1..=MAX_LEADERBOARD_SIZE`.
pub fn clamp_leaderboard_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
        .clamp(1, MAX_LEADERBOARD_SIZE)
}
