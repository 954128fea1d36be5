//! Route definitions for the `/semesters` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::semester;
use crate::state::AppState;

/// Routes mounted at `/semesters`.
///
/// ```text
/// GET    /            -> list
/// POST   /            -> create
/// GET    /active      -> list_active
/// GET    /{id}        -> get_by_id
/// PUT    /{id}        -> update
/// DELETE /{id}        -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(semester::list).post(semester::create))
        .route("/active", get(semester::list_active))
        .route(
            "/{id}",
            get(semester::get_by_id)
                .put(semester::update)
                .delete(semester::delete),
        )
}
