//! Handlers for the `/reports` endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use rollcall_core::error::CoreError;
use rollcall_core::reporting::clamp_leaderboard_limit;
use rollcall_core::types::DbId;
use rollcall_db::models::report::{
    ClassReport, Dashboard, EventReportRow, OverviewReport, StudentReport,
};
use rollcall_db::repositories::ReportRepo;

use crate::error::{AppError, AppResult};
use crate::query::{KindParams, LimitParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/reports/dashboard
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<DataResponse<Dashboard>>> {
    let dashboard = ReportRepo::dashboard(&state.pool, Utc::now()).await?;
    Ok(Json(DataResponse { data: dashboard }))
}

/// GET /api/v1/reports/overview?limit=
pub async fn overview(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<OverviewReport>>> {
    let limit = clamp_leaderboard_limit(params.limit);
    let report = ReportRepo::overview(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/reports/classes/{id}
pub async fn class_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClassReport>>> {
    let report = ReportRepo::class_report(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Class", id }))?;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/reports/events?kind=
pub async fn event_report(
    State(state): State<AppState>,
    Query(params): Query<KindParams>,
) -> AppResult<Json<DataResponse<Vec<EventReportRow>>>> {
    let rows = ReportRepo::event_report(&state.pool, params.kind).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/reports/students/{id}
pub async fn student_report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StudentReport>>> {
    let report = ReportRepo::student_report(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id,
        }))?;
    Ok(Json(DataResponse { data: report }))
}
