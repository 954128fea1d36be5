//! Handlers for event allocations, roll call, and `/allocations/{id}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::attendance::AttendanceStatus;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::allocation::{
    Allocation, AllocationDetail, BulkAllocate, BulkAllocationResult, ConflictCheck,
    CreateAllocation, RollCall, RollCallResult, UpdateAllocation,
};
use rollcall_db::repositories::{AllocationRepo, EventRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::event;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Allocation",
        id,
    })
}

/// GET /api/v1/events/{id}/allocations
pub async fn list_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AllocationDetail>>>> {
    EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| event::not_found(event_id))?;
    let allocations = AllocationRepo::list_for_event(&state.pool, event_id).await?;
    Ok(Json(DataResponse { data: allocations }))
}

/// POST /api/v1/events/{id}/allocations
///
/// Returns 409 `SCHEDULE_CONFLICT` when the student is already booked in an
/// overlapping window.
pub async fn create(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<CreateAllocation>,
) -> AppResult<(StatusCode, Json<DataResponse<Allocation>>)> {
    input.validate()?;
    let allocation = AllocationRepo::create(&state.pool, event_id, &input).await?;
    tracing::info!(
        allocation_id = allocation.id,
        event_id,
        student_id = allocation.student_id,
        "Allocation created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: allocation })))
}

/// POST /api/v1/events/{id}/allocations/bulk
///
/// Partial success: created allocations and per-student failures are both
/// returned with 200.
pub async fn bulk_create(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<BulkAllocate>,
) -> AppResult<Json<DataResponse<BulkAllocationResult>>> {
    input.validate()?;
    let result = AllocationRepo::bulk_allocate(&state.pool, event_id, &input.student_ids).await?;
    tracing::info!(
        event_id,
        created = result.created.len(),
        failed = result.failed.len(),
        "Bulk allocation finished"
    );
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/events/{id}/roll-call
pub async fn roll_call(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<RollCall>,
) -> AppResult<Json<DataResponse<RollCallResult>>> {
    let result =
        AllocationRepo::roll_call(&state.pool, event_id, &input.present_student_ids).await?;
    tracing::info!(
        event_id,
        present = result.present,
        absent = result.absent,
        "Roll call recorded"
    );
    Ok(Json(DataResponse { data: result }))
}

/// PUT /api/v1/allocations/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAllocation>,
) -> AppResult<Json<DataResponse<Allocation>>> {
    input.validate()?;
    let status = AttendanceStatus::from_id(input.status_id).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown attendance status {}",
            input.status_id
        )))
    })?;
    let allocation = AllocationRepo::update_status(&state.pool, id, status, ConflictCheck::Enforce)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(allocation_id = id, status = status.label(), "Allocation status changed");
    Ok(Json(DataResponse { data: allocation }))
}

/// DELETE /api/v1/allocations/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if AllocationRepo::delete(&state.pool, id).await? {
        tracing::info!(allocation_id = id, "Allocation deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
