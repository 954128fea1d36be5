//! Handlers for the `/workshops` resource and workshop rosters.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::student::Student;
use rollcall_db::models::workshop::{
    BulkCreateWorkshops, CreateWorkshop, SetWorkshopStudents, UpdateWorkshop, Workshop,
    WorkshopFilter, WorkshopSummary,
};
use rollcall_db::repositories::WorkshopRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Workshop",
        id,
    })
}

/// POST /api/v1/workshops
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkshop>,
) -> AppResult<(StatusCode, Json<DataResponse<Workshop>>)> {
    input.validate()?;
    let workshop = WorkshopRepo::create(&state.pool, &input).await?;
    tracing::info!(workshop_id = workshop.id, name = %workshop.name, "Workshop created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: workshop })))
}

/// POST /api/v1/workshops/bulk
///
/// All-or-nothing: a single invalid entry rejects the whole batch.
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(input): Json<BulkCreateWorkshops>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Workshop>>>)> {
    input.validate()?;
    let workshops = WorkshopRepo::bulk_create(&state.pool, &input.workshops).await?;
    tracing::info!(count = workshops.len(), "Workshops created in bulk");
    Ok((StatusCode::CREATED, Json(DataResponse { data: workshops })))
}

/// GET /api/v1/workshops?q=
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<WorkshopFilter>,
) -> AppResult<Json<DataResponse<Vec<WorkshopSummary>>>> {
    let workshops = WorkshopRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: workshops }))
}

/// GET /api/v1/workshops/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Workshop>>> {
    let workshop = WorkshopRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: workshop }))
}

/// PUT /api/v1/workshops/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkshop>,
) -> AppResult<Json<DataResponse<Workshop>>> {
    input.validate()?;
    let workshop = WorkshopRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: workshop }))
}

/// DELETE /api/v1/workshops/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if WorkshopRepo::delete(&state.pool, id).await? {
        tracing::info!(workshop_id = id, "Workshop deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/workshops/{id}/students
pub async fn list_students(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    WorkshopRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let students = WorkshopRepo::list_students(&state.pool, id).await?;
    Ok(Json(DataResponse { data: students }))
}

/// PUT /api/v1/workshops/{id}/students
///
/// Replace the roster of active-semester students.
pub async fn set_students(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetWorkshopStudents>,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    let students = WorkshopRepo::set_students(&state.pool, id, &input.student_ids).await?;
    tracing::info!(workshop_id = id, roster_size = students.len(), "Workshop roster replaced");
    Ok(Json(DataResponse { data: students }))
}
