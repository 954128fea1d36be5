//! Service health for load balancers and the front-end status badge.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use rollcall_db::repositories::SemesterRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database cannot be queried.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Number of active semesters. `None` when the database is down.
    pub active_semesters: Option<i64>,
    /// Offset used to read local event times, in minutes from UTC.
    pub local_utc_offset_minutes: i32,
}

/// GET /health
///
/// Answers 200 when the database responds and 503 otherwise.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let active_semesters = match SemesterRepo::count_active(&state.pool).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            None
        }
    };
    let db_healthy = active_semesters.is_some();

    let (code, status) = if db_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        active_semesters,
        local_utc_offset_minutes: state.config.local_utc_offset_minutes,
    };
    (code, Json(body))
}

/// Root-level routes, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
