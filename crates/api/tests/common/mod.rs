#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use rollcall_api::config::ServerConfig;
use rollcall_api::router::build_app_router;
use rollcall_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Event times are read at UTC-3, matching the production default.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        cors_max_age_secs: 600,
        request_timeout_secs: 30,
        local_utc_offset_minutes: -180,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST a JSON body, assert 201, and return the `id` from the `data` envelope.
pub async fn create_id(pool: &PgPool, uri: &str, body: serde_json::Value) -> i64 {
    let response = post_json(build_test_app(pool.clone()), uri, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED, "POST {uri}");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// An active semester with one class. Returns the class id.
pub async fn seed_class(pool: &PgPool) -> i64 {
    let semester_id = create_id(
        pool,
        "/api/v1/semesters",
        serde_json::json!({"name": "2024.1"}),
    )
    .await;
    create_id(
        pool,
        "/api/v1/classes",
        serde_json::json!({"semester_id": semester_id, "name": "7A"}),
    )
    .await
}

pub async fn seed_student(pool: &PgPool, class_id: i64, name: &str) -> i64 {
    create_id(
        pool,
        "/api/v1/students",
        serde_json::json!({"class_id": class_id, "name": name}),
    )
    .await
}

/// Create a sporadic event on 2024-03-04 between two local times. Returns its id.
pub async fn seed_event(pool: &PgPool, title: &str, start: &str, end: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/events",
        serde_json::json!({
            "title": title,
            "kind_id": 2,
            "date": "2024-03-04",
            "start_time": start,
            "end_time": end,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"][0]["id"].as_i64().unwrap()
}
