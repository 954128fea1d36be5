//! HTTP-level integration tests for semesters, classes, workshops, and students.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_id, delete, get, post_json, put_json, seed_class, seed_student};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Semesters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_semester_returns_201(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/semesters", json!({"name": "2024.1"})).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "2024.1");
    assert_eq!(json["data"]["is_active"], true);
    assert!(json["data"]["id"].is_number());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_semester_name_too_long_returns_field_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/semesters", json!({"name": "2024.1-extra"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["name"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_semester_returns_409(pool: PgPool) {
    create_id(&pool, "/api/v1/semesters", json!({"name": "2024.1"})).await;

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/semesters", json!({"name": "2024.1"})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_semester_with_classes_returns_409(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let app = common::build_test_app(pool.clone());
    let class = body_json(get(app, &format!("/api/v1/classes/{class_id}")).await).await;
    let semester_id = class["data"]["semester_id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/semesters/{semester_id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/classes/{class_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/semesters/{semester_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_active_semesters_only(pool: PgPool) {
    create_id(&pool, "/api/v1/semesters", json!({"name": "2024.1"})).await;
    create_id(
        &pool,
        "/api/v1/semesters",
        json!({"name": "2023.2", "is_active": false}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let all = body_json(get(app, "/api/v1/semesters").await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let active = body_json(get(app, "/api/v1/semesters/active").await).await;
    let active = active["data"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["name"], "2024.1");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_nonexistent_semester_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/semesters/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_class_in_inactive_semester_rejected(pool: PgPool) {
    let semester_id = create_id(
        &pool,
        "/api/v1/semesters",
        json!({"name": "2023.2", "is_active": false}),
    )
    .await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/classes",
        json!({"semester_id": semester_id, "name": "8B"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_copy_class(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    seed_student(&pool, class_id, "Ana").await;
    let target = create_id(&pool, "/api/v1/semesters", json!({"name": "2024.2"})).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/classes/{class_id}/copy"),
        json!({"semester_id": target}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["students_copied"], 1);
    let copy_id = json["data"]["class"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let listed = body_json(get(app, &format!("/api/v1/classes/{copy_id}")).await).await;
    assert_eq!(listed["data"]["student_count"], 1);
    assert_eq!(listed["data"]["semester_name"], "2024.2");
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bulk_students_from_pasted_names(pool: PgPool) {
    let class_id = seed_class(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/students/bulk",
        json!({"class_id": class_id, "names": "Ana\n\n  Bruno  \nCarla\n"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);

    let app = common::build_test_app(pool.clone());
    let listed = body_json(get(app, &format!("/api/v1/students?class_id={class_id}")).await).await;
    let names: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ana", "Bruno", "Carla"]);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/students/bulk",
        json!({"class_id": class_id, "names": "  \n\n"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_and_delete_student(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let id = seed_student(&pool, class_id, "Ana").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/students/{id}"),
        json!({"name": "Ana Souza"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Ana Souza");

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/students/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/students/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Workshops
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_workshop_roster_round_trip(pool: PgPool) {
    let class_id = seed_class(&pool).await;
    let ana = seed_student(&pool, class_id, "Ana").await;
    let bruno = seed_student(&pool, class_id, "Bruno").await;
    let workshop_id = create_id(
        &pool,
        "/api/v1/workshops",
        json!({"name": "Robotics", "default_location": "Lab 1", "student_ids": [ana]}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/workshops/{workshop_id}/students"),
        json!({"student_ids": [bruno]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let roster = body_json(response).await;
    assert_eq!(roster["data"].as_array().unwrap().len(), 1);
    assert_eq!(roster["data"][0]["name"], "Bruno");

    let app = common::build_test_app(pool.clone());
    let student = body_json(get(app, &format!("/api/v1/students/{bruno}")).await).await;
    assert_eq!(student["data"]["workshop_ids"], json!([workshop_id]));

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        "/api/v1/workshops/999999/students",
        json!({"student_ids": []}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bulk_workshops_all_or_nothing(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/workshops/bulk",
        json!({"workshops": [
            {"name": "Art", "default_location": "Studio"},
            {"name": "", "default_location": "Hall"}
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let listed = body_json(get(app, "/api/v1/workshops").await).await;
    assert!(listed["data"].as_array().unwrap().is_empty());

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/workshops/bulk",
        json!({"workshops": [
            {"name": "Art", "default_location": "Studio"},
            {"name": "Music", "default_location": "Hall"}
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}
