//! Event entity model and DTOs.

use chrono::{NaiveDate, NaiveTime};
use rollcall_core::error::CoreError;
use rollcall_core::events::{resolve_location, EventKind};
use rollcall_core::recurrence::{Cadence, ScheduleRequest};
use rollcall_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `events` table, with its linked workshops.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub kind_id: StatusId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    /// Explicit location, if one was set.
    pub location: Option<String>,
    pub weight: i32,
    pub is_cancelled: bool,
    pub workshop_ids: Vec<DbId>,
    /// Default locations of linked workshops, ordered by workshop name.
    #[serde(skip_serializing)]
    pub workshop_locations: Vec<String>,
    /// Explicit location or the first workshop's default. Filled after fetch.
    #[sqlx(skip)]
    pub resolved_location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    /// Populate [`Event::resolved_location`] from the fetched columns.
    pub fn resolve_location(&mut self) {
        self.resolved_location = resolve_location(
            self.location.as_deref(),
            self.workshop_locations.iter().map(String::as_str),
        );
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_id(self.kind_id)
    }
}

/// Event with allocation counts, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub allocation_count: i64,
    pub present_count: i64,
}

/// DTO for creating one sporadic event or a periodic series.
///
/// Dates and times are in the school's local time; the API converts them to
/// UTC with the configured offset.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(range(min = 1, max = 2, message = "kind_id must be 1 (periodic) or 2 (sporadic)"))]
    pub kind_id: StatusId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub cadence: Option<Cadence>,
    pub interval_days: Option<u32>,
    pub recurrence_end: Option<NaiveDate>,
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
    /// Defaults to 1 if omitted.
    #[validate(range(min = 1, message = "Weight must be at least 1"))]
    pub weight: Option<i32>,
    pub workshop_ids: Option<Vec<DbId>>,
}

impl CreateEvent {
    /// The recurrence part of the request.
    pub fn schedule(&self) -> Result<ScheduleRequest, CoreError> {
        let kind = EventKind::from_id(self.kind_id).ok_or_else(|| {
            CoreError::Validation(format!("Unknown event kind {}", self.kind_id))
        })?;
        Ok(ScheduleRequest {
            kind,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            cadence: self.cadence,
            interval_days: self.interval_days,
            recurrence_end: self.recurrence_end,
        })
    }
}

/// DTO for editing a single event. All fields are optional.
///
/// An empty `location` clears the explicit location.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 1, max = 2, message = "kind_id must be 1 (periodic) or 2 (sporadic)"))]
    pub kind_id: Option<StatusId>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
    #[validate(range(min = 1, message = "Weight must be at least 1"))]
    pub weight: Option<i32>,
    pub workshop_ids: Option<Vec<DbId>>,
}

/// Query filter for event listings (`?q=&kind_id=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub q: Option<String>,
    pub kind_id: Option<StatusId>,
}
