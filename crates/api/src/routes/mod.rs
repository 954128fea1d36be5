pub mod allocation;
pub mod class;
pub mod event;
pub mod health;
pub mod report;
pub mod semester;
pub mod student;
pub mod workshop;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /semesters                                  list, create
/// /semesters/active                           active only
/// /semesters/{id}                             get, update, delete
///
/// /classes                                    list (?q, semester_id, include_inactive), create
/// /classes/{id}                               get, update, delete
/// /classes/{id}/copy                          copy into another semester (POST)
///
/// /workshops                                  list (?q), create
/// /workshops/bulk                             create many (POST)
/// /workshops/{id}                             get, update, delete
/// /workshops/{id}/students                    roster get, replace (PUT)
///
/// /students                                   list (?q, class_id, include_inactive), create
/// /students/bulk                              create from pasted names (POST)
/// /students/{id}                              get, update, delete
/// /students/{id}/allocations                  allocation history
///
/// /events                                     list (?q, kind), create (single or series)
/// /events/{id}                                get, update, delete
/// /events/{id}/cancel                         toggle cancelled (POST)
/// /events/{id}/allocations                    list, create
/// /events/{id}/allocations/bulk               allocate many (POST)
/// /events/{id}/eligible-students              students that can still be allocated
/// /events/{id}/roll-call                      record attendance (POST)
/// /events/{id}/summary                        event with expected attendees
///
/// /calendar                                   non-cancelled events (?start, end)
///
/// /allocations/{id}                           update status, delete
///
/// /reports/dashboard                          headline counts, upcoming events
/// /reports/overview                           totals and leaderboard (?limit)
/// /reports/classes/{id}                       per-student attendance
/// /reports/events                             per-event attendance (?kind)
/// /reports/students/{id}                      one student's attendance
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/semesters", semester::router())
        .nest("/classes", class::router())
        .nest("/workshops", workshop::router())
        .nest("/students", student::router())
        .nest("/events", event::router())
        .route("/calendar", get(handlers::event::calendar))
        .nest("/allocations", allocation::router())
        .nest("/reports", report::router())
}
