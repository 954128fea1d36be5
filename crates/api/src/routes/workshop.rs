//! Route definitions for the `/workshops` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::workshop;
use crate::state::AppState;

/// Routes mounted at `/workshops`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// POST   /bulk            -> bulk_create
/// GET    /{id}            -> get_by_id
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete
/// GET    /{id}/students   -> list_students
/// PUT    /{id}/students   -> set_students
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(workshop::list).post(workshop::create))
        .route("/bulk", post(workshop::bulk_create))
        .route(
            "/{id}",
            get(workshop::get_by_id)
                .put(workshop::update)
                .delete(workshop::delete),
        )
        .route(
            "/{id}/students",
            get(workshop::list_students).put(workshop::set_students),
        )
}
