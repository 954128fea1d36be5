//! Handlers for the `/classes` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::class::{
    Class, ClassCopyResult, ClassFilter, ClassSummary, CopyClass, CreateClass, UpdateClass,
};
use rollcall_db::repositories::ClassRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Class", id })
}

/// POST /api/v1/classes
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateClass>,
) -> AppResult<(StatusCode, Json<DataResponse<Class>>)> {
    input.validate()?;
    let class = ClassRepo::create(&state.pool, &input).await?;
    tracing::info!(class_id = class.id, semester_id = class.semester_id, "Class created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: class })))
}

/// GET /api/v1/classes?q=&semester_id=&include_inactive=
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ClassFilter>,
) -> AppResult<Json<DataResponse<Vec<ClassSummary>>>> {
    let classes = ClassRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: classes }))
}

/// GET /api/v1/classes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClassSummary>>> {
    let class = ClassRepo::find_summary(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: class }))
}

/// PUT /api/v1/classes/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClass>,
) -> AppResult<Json<DataResponse<Class>>> {
    input.validate()?;
    let class = ClassRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: class }))
}

/// DELETE /api/v1/classes/{id}
///
/// Students and their allocations are deleted with the class.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if ClassRepo::delete(&state.pool, id).await? {
        tracing::info!(class_id = id, "Class deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/classes/{id}/copy
///
/// Copy the class, its students, and their fixed workshops into another
/// active semester.
pub async fn copy(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CopyClass>,
) -> AppResult<(StatusCode, Json<DataResponse<ClassCopyResult>>)> {
    input.validate()?;
    let result = ClassRepo::copy_to_semester(&state.pool, id, &input).await?;
    tracing::info!(
        source_class_id = id,
        class_id = result.class.id,
        students_copied = result.students_copied,
        "Class copied"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}
