//! Route definitions for the `/reports` endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::report;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET /dashboard        -> dashboard
/// GET /overview         -> overview
/// GET /classes/{id}     -> class_report
/// GET /events           -> event_report
/// GET /students/{id}    -> student_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(report::dashboard))
        .route("/overview", get(report::overview))
        .route("/classes/{id}", get(report::class_report))
        .route("/events", get(report::event_report))
        .route("/students/{id}", get(report::student_report))
}
