//! Shared query parameter types for API handlers.

use rollcall_core::types::{StatusId, Timestamp};
use serde::Deserialize;

/// Leaderboard size for the overview report (`?limit=`).
///
/// Clamped with `rollcall_core::reporting::clamp_leaderboard_limit`.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

/// Event kind filter (`?kind=`), used by event listings and the event report.
#[derive(Debug, Deserialize)]
pub struct KindParams {
    pub kind: Option<StatusId>,
}

/// Free-text search plus kind filter for event listings (`?q=&kind=`).
#[derive(Debug, Deserialize)]
pub struct EventListParams {
    pub q: Option<String>,
    pub kind: Option<StatusId>,
}

/// Calendar range (`?start=&end=`), RFC 3339 timestamps. Both bounds optional.
#[derive(Debug, Deserialize)]
pub struct CalendarParams {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}
