//! Handlers for the `/students` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::roster::parse_name_list;
use rollcall_core::types::DbId;
use rollcall_db::models::student::{
    BulkCreateStudents, CreateStudent, Student, StudentAllocation, StudentFilter, StudentSummary,
    UpdateStudent,
};
use rollcall_db::repositories::StudentRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Student",
        id,
    })
}

/// POST /api/v1/students
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<DataResponse<Student>>)> {
    input.validate()?;
    let student = StudentRepo::create(&state.pool, &input).await?;
    tracing::info!(student_id = student.id, class_id = student.class_id, "Student created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: student })))
}

/// POST /api/v1/students/bulk
///
/// `names` holds one student per line; blank lines are ignored.
pub async fn bulk_create(
    State(state): State<AppState>,
    Json(input): Json<BulkCreateStudents>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Student>>>)> {
    input.validate()?;
    let names = parse_name_list(&input.names)?;
    let students = StudentRepo::bulk_create(&state.pool, input.class_id, &names).await?;
    tracing::info!(class_id = input.class_id, count = students.len(), "Students created in bulk");
    Ok((StatusCode::CREATED, Json(DataResponse { data: students })))
}

/// GET /api/v1/students?q=&class_id=&include_inactive=
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<StudentFilter>,
) -> AppResult<Json<DataResponse<Vec<StudentSummary>>>> {
    let students = StudentRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: students }))
}

/// GET /api/v1/students/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StudentSummary>>> {
    let student = StudentRepo::find_summary(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: student }))
}

/// PUT /api/v1/students/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStudent>,
) -> AppResult<Json<DataResponse<Student>>> {
    input.validate()?;
    let student = StudentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: student }))
}

/// DELETE /api/v1/students/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if StudentRepo::delete(&state.pool, id).await? {
        tracing::info!(student_id = id, "Student deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/students/{id}/allocations
pub async fn list_allocations(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StudentAllocation>>>> {
    StudentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let allocations = StudentRepo::list_allocations(&state.pool, id).await?;
    Ok(Json(DataResponse { data: allocations }))
}
