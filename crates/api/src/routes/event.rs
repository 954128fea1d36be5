//! Route definitions for the `/events` resource.
//!
//! Also nests allocation and roll-call routes under `/events/{id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{allocation, event};
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// POST   /{id}/cancel               -> toggle_cancelled
/// GET    /{id}/eligible-students    -> eligible_students
/// GET    /{id}/summary              -> summary
///
/// GET    /{id}/allocations          -> allocation::list_for_event
/// POST   /{id}/allocations          -> allocation::create
/// POST   /{id}/allocations/bulk     -> allocation::bulk_create
/// POST   /{id}/roll-call            -> allocation::roll_call
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(event::list).post(event::create))
        .route(
            "/{id}",
            get(event::get_by_id).put(event::update).delete(event::delete),
        )
        .route("/{id}/cancel", post(event::toggle_cancelled))
        .route("/{id}/eligible-students", get(event::eligible_students))
        .route("/{id}/summary", get(event::summary))
        .route(
            "/{id}/allocations",
            get(allocation::list_for_event).post(allocation::create),
        )
        .route("/{id}/allocations/bulk", post(allocation::bulk_create))
        .route("/{id}/roll-call", post(allocation::roll_call))
}
