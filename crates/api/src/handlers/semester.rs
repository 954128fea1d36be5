//! Handlers for the `/semesters` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::semester::{CreateSemester, Semester, SemesterSummary, UpdateSemester};
use rollcall_db::repositories::SemesterRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/semesters
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSemester>,
) -> AppResult<(StatusCode, Json<DataResponse<Semester>>)> {
    input.validate()?;
    let semester = SemesterRepo::create(&state.pool, &input).await?;
    tracing::info!(semester_id = semester.id, name = %semester.name, "Semester created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: semester })))
}

/// GET /api/v1/semesters
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<SemesterSummary>>>> {
    let semesters = SemesterRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: semesters }))
}

/// GET /api/v1/semesters/active
///
/// Active semesters only, for pickers.
pub async fn list_active(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Semester>>>> {
    let semesters = SemesterRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: semesters }))
}

/// GET /api/v1/semesters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Semester>>> {
    let semester = SemesterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Semester",
            id,
        }))?;
    Ok(Json(DataResponse { data: semester }))
}

/// PUT /api/v1/semesters/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSemester>,
) -> AppResult<Json<DataResponse<Semester>>> {
    input.validate()?;
    let semester = SemesterRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Semester",
            id,
        }))?;
    Ok(Json(DataResponse { data: semester }))
}

/// DELETE /api/v1/semesters/{id}
///
/// Rejected with 409 while the semester still has classes.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = SemesterRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(semester_id = id, "Semester deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Semester",
            id,
        }))
    }
}
