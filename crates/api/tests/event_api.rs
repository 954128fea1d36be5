//! HTTP-level integration tests for events, allocations, and reports.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_id, get, post_json, put_json, seed_class, seed_event, seed_student,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_weekly_series(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/events",
        json!({
            "title": "Robotics",
            "kind_id": 1,
            "date": "2024-03-04",
            "start_time": "14:00:00",
            "end_time": "16:00:00",
            "cadence": "weekly",
            "recurrence_end": "2024-03-25",
            "weight": 2
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let events = json["data"].as_array().unwrap();
    assert_eq!(events.len(), 4);
    // 14:00 local at UTC-3.
    assert_eq!(events[0]["starts_at"], "2024-03-04T17:00:00Z");
    assert_eq!(events[3]["starts_at"], "2024-03-25T17:00:00Z");
    assert_eq!(events[0]["weight"], 2);

    let app = common::build_test_app(pool);
    let listed = body_json(get(app, "/api/v1/events?kind=1").await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_periodic_without_cadence_lists_fields(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/events",
        json!({
            "title": "Robotics",
            "kind_id": 1,
            "date": "2024-03-04",
            "start_time": "14:00:00",
            "end_time": "13:00:00"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["cadence"].is_array());
    assert!(json["fields"]["recurrence_end"].is_array());
    assert!(json["fields"]["end_time"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_calendar_colours_and_locations(pool: PgPool) {
    let workshop_id = create_id(
        &pool,
        "/api/v1/workshops",
        json!({"name": "Robotics", "default_location": "Lab 1"}),
    )
    .await;
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/events",
        json!({
            "title": "Fair",
            "kind_id": 2,
            "date": "2024-03-04",
            "start_time": "09:00:00",
            "end_time": "10:00:00",
            "workshop_ids": [workshop_id]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cancelled = seed_event(&pool, "Trip", "11:00:00", "12:00:00").await;

    let app = common::build_test_app(pool.clone());
    post_json(app, &format!("/api/v1/events/{cancelled}/cancel"), json!({})).await;

    let app = common::build_test_app(pool);
    let response = get(
        app,
        "/api/v1/calendar?start=2024-03-01T00:00:00Z&end=2024-03-10T00:00:00Z",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["title"], "Fair");
    assert_eq!(entries[0]["color"], "#c90c0f");
    assert_eq!(entries[0]["location"], "Lab 1");
}

// ---------------------------------------------------------------------------
// Allocations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_overlapping_allocation_returns_schedule_conflict(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let ana = seed_student(&pool, class_id, "Ana").await;
    let choir = seed_event(&pool, "Choir", "09:00:00", "11:00:00").await;
    let chess = seed_event(&pool, "Chess", "10:00:00", "12:00:00").await;

    let allocation_id = create_id(
        &pool,
        &format!("/api/v1/events/{choir}/allocations"),
        json!({"student_id": ana}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/events/{chess}/allocations"),
        json!({"student_id": ana}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SCHEDULE_CONFLICT");
    assert!(json["conflicts"][0].as_str().unwrap().starts_with("Choir"));

    // Marking the first one absent frees the slot.
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/allocations/{allocation_id}"),
        json!({"status": 3}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/events/{chess}/allocations"),
        json!({"student_id": ana}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_status_rejected(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let ana = seed_student(&pool, class_id, "Ana").await;
    let choir = seed_event(&pool, "Choir", "09:00:00", "10:00:00").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/events/{choir}/allocations"),
        json!({"student_id": ana, "status": 9}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["status_id"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bulk_allocation_partial_success(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let ana = seed_student(&pool, class_id, "Ana").await;
    let bruno = seed_student(&pool, class_id, "Bruno").await;
    let choir = seed_event(&pool, "Choir", "09:00:00", "11:00:00").await;
    let chess = seed_event(&pool, "Chess", "10:00:00", "12:00:00").await;
    create_id(
        &pool,
        &format!("/api/v1/events/{choir}/allocations"),
        json!({"student_id": bruno}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/events/{chess}/allocations/bulk"),
        json!({"student_ids": [ana, bruno]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["created"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"]["failed"][0]["student_id"], bruno);

    // Ana is allocated now, so only Bruno would still be eligible.
    let app = common::build_test_app(pool);
    let eligible =
        body_json(get(app, &format!("/api/v1/events/{chess}/eligible-students")).await).await;
    let eligible = eligible["data"].as_array().unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0]["id"], bruno);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_roll_call_and_reports(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let ana = seed_student(&pool, class_id, "Ana").await;
    let bruno = seed_student(&pool, class_id, "Bruno").await;
    let choir = seed_event(&pool, "Choir", "09:00:00", "10:00:00").await;

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        &format!("/api/v1/events/{choir}/allocations/bulk"),
        json!({"student_ids": [ana, bruno]}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/events/{choir}/roll-call"),
        json!({"present_student_ids": [ana]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["present"], 1);
    assert_eq!(json["data"]["absent"], 1);

    let app = common::build_test_app(pool.clone());
    let summary = body_json(get(app, &format!("/api/v1/events/{choir}/summary")).await).await;
    assert_eq!(summary["data"]["attendees"].as_array().unwrap().len(), 1);
    assert_eq!(summary["data"]["attendees"][0]["student_name"], "Ana");

    let app = common::build_test_app(pool.clone());
    let report = body_json(get(app, &format!("/api/v1/reports/classes/{class_id}")).await).await;
    let rows = report["data"]["students"].as_array().unwrap();
    assert_eq!(rows[0]["name"], "Ana");
    assert_eq!(rows[0]["points"], 1);
    assert_eq!(rows[0]["percentage"], 100);
    assert_eq!(rows[1]["percentage"], 0);

    let app = common::build_test_app(pool.clone());
    let overview = body_json(get(app, "/api/v1/reports/overview?limit=1").await).await;
    assert_eq!(overview["data"]["attendance"]["percentage"], 50);
    assert_eq!(overview["data"]["leaderboard"].as_array().unwrap().len(), 1);
    assert_eq!(overview["data"]["leaderboard"][0]["name"], "Ana");

    let app = common::build_test_app(pool.clone());
    let student = body_json(get(app, &format!("/api/v1/reports/students/{bruno}")).await).await;
    assert_eq!(student["data"]["attendance"]["absent"], 1);

    let app = common::build_test_app(pool);
    let events = body_json(get(app, "/api/v1/reports/events?kind=2").await).await;
    assert_eq!(events["data"][0]["allocated"], 2);
    assert_eq!(events["data"][0]["present"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_roll_call_unknown_student_rejected(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let outsider = seed_student(&pool, class_id, "Outsider").await;
    let choir = seed_event(&pool, "Choir", "09:00:00", "10:00:00").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        &format!("/api/v1/events/{choir}/roll-call"),
        json!({"present_student_ids": [outsider]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_moving_event_into_conflict_returns_409(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let ana = seed_student(&pool, class_id, "Ana").await;
    let choir = seed_event(&pool, "Choir", "09:00:00", "10:00:00").await;
    let chess = seed_event(&pool, "Chess", "14:00:00", "15:00:00").await;
    for event_id in [choir, chess] {
        create_id(
            &pool,
            &format!("/api/v1/events/{event_id}/allocations"),
            json!({"student_id": ana}),
        )
        .await;
    }

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/events/{chess}"),
        json!({
            "starts_at": "2024-03-04T12:30:00Z",
            "ends_at": "2024-03-04T13:30:00Z"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "SCHEDULE_CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_dashboard_counts(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    seed_student(&pool, class_id, "Ana").await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/reports/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["class_count"], 1);
    assert_eq!(json["data"]["student_count"], 1);
    assert!(json["data"]["upcoming_events"].as_array().unwrap().is_empty());
}
