//! Route definitions for the `/allocations` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::allocation;
use crate::state::AppState;

/// Routes mounted at `/allocations`.
///
/// ```text
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", put(allocation::update).delete(allocation::delete))
}
