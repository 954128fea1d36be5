//! Handlers for the `/events` resource and the calendar feed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::events::EventKind;
use rollcall_core::types::{DbId, StatusId, Timestamp};
use rollcall_db::models::allocation::AllocationDetail;
use rollcall_db::models::event::{CreateEvent, Event, EventFilter, EventSummary, UpdateEvent};
use rollcall_db::models::student::EligibleStudent;
use rollcall_db::repositories::{AllocationRepo, EventRepo, StudentRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::{CalendarParams, EventListParams};
use crate::response::DataResponse;
use crate::state::AppState;

pub(crate) fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Event", id })
}

/// One calendar entry, coloured by kind.
#[derive(Debug, Serialize)]
pub struct CalendarEntry {
    pub id: DbId,
    pub title: String,
    pub kind_id: StatusId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub location: Option<String>,
    pub color: &'static str,
}

impl From<Event> for CalendarEntry {
    fn from(event: Event) -> Self {
        let color = event
            .kind()
            .unwrap_or(EventKind::Sporadic)
            .calendar_color();
        Self {
            id: event.id,
            title: event.title,
            kind_id: event.kind_id,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            location: event.resolved_location,
            color,
        }
    }
}

/// Public view of an event with the students expected to attend.
#[derive(Debug, Serialize)]
pub struct EventAttendance {
    pub event: Event,
    pub attendees: Vec<AllocationDetail>,
}

/// POST /api/v1/events
///
/// Creates one sporadic event or a whole periodic series. Dates and times
/// are read in the configured local offset.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Event>>>)> {
    input.validate()?;
    let windows = input.schedule()?.windows(state.config.local_offset())?;
    let events = EventRepo::create_series(&state.pool, &input, &windows).await?;
    tracing::info!(
        count = events.len(),
        kind_id = input.kind_id,
        title = %input.title,
        "Events created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: events })))
}

/// GET /api/v1/events?q=&kind=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> AppResult<Json<DataResponse<Vec<EventSummary>>>> {
    let filter = EventFilter {
        q: params.q,
        kind_id: params.kind,
    };
    let events = EventRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/events/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Event>>> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: event }))
}

/// PUT /api/v1/events/{id}
///
/// Moving the event re-checks every blocking allocation on it; a clash
/// rejects the whole edit with 409.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEvent>,
) -> AppResult<Json<DataResponse<Event>>> {
    input.validate()?;
    let event = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(event_id = id, "Event updated");
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if EventRepo::delete(&state.pool, id).await? {
        tracing::info!(event_id = id, "Event deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/events/{id}/cancel
///
/// Toggles the cancelled flag.
pub async fn toggle_cancelled(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Event>>> {
    let event = EventRepo::toggle_cancelled(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(event_id = id, is_cancelled = event.is_cancelled, "Event cancel flag toggled");
    Ok(Json(DataResponse { data: event }))
}

/// GET /api/v1/events/{id}/eligible-students
pub async fn eligible_students(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<EligibleStudent>>>> {
    EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let students = StudentRepo::eligible_for_event(&state.pool, id).await?;
    Ok(Json(DataResponse { data: students }))
}

/// GET /api/v1/events/{id}/summary
pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventAttendance>>> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let attendees = AllocationRepo::list_attendees(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: EventAttendance { event, attendees },
    }))
}

/// GET /api/v1/calendar?start=&end=
pub async fn calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> AppResult<Json<DataResponse<Vec<CalendarEntry>>>> {
    if let (Some(start), Some(end)) = (params.start, params.end) {
        if end < start {
            return Err(AppError::BadRequest(
                "Calendar end must not be before start".to_string(),
            ));
        }
    }
    let entries = EventRepo::calendar(&state.pool, params.start, params.end)
        .await?
        .into_iter()
        .map(CalendarEntry::from)
        .collect();
    Ok(Json(DataResponse { data: entries }))
}
