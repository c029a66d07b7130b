//! End-to-end tests of the HTTP surface, driven in process through the router.

use std::sync::Arc;

use api_lib::{adapters::InMemoryDb, config::Config, web, web::state::AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use tracing::Level;

struct TestApp {
    router: Router,
    db: Arc<InMemoryDb>,
    _assets: TempDir,
}

fn test_app() -> TestApp {
    let assets = tempfile::tempdir().expect("Failed to create temp dir");
    let public_dir = assets.path().join("public");
    std::fs::create_dir_all(&public_dir).unwrap();
    std::fs::write(public_dir.join("style.css"), "body { color: red; }").unwrap();
    let index_path = assets.path().join("index.html");
    std::fs::write(&index_path, "<h1>Exercise tracker</h1>").unwrap();

    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "memory://".to_string(),
        database_name: "tracker_test".to_string(),
        max_connections: 1,
        log_level: Level::DEBUG,
        public_dir,
        index_path,
    };
    let db = Arc::new(InMemoryDb::new());
    let state = Arc::new(AppState {
        db: db.clone(),
        config: Arc::new(config),
    });

    TestApp {
        router: web::router(state),
        db,
        _assets: assets,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &TestApp, request: Request<Body>) -> Value {
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn create_user(app: &TestApp, username: &str) -> String {
    let user = send_json(app, post_json("/api/users", json!({ "username": username }))).await;
    user["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_walkthrough_alice_runs() {
    let app = test_app();

    let user = send_json(&app, post_json("/api/users", json!({ "username": "alice" }))).await;
    assert_eq!(user["username"], "alice");
    let id = user["id"].as_str().unwrap().to_string();

    let exercise = send_json(
        &app,
        post_json(
            &format!("/api/users/{id}/exercises"),
            json!({ "description": "run", "duration": 30, "date": "2023-01-01" }),
        ),
    )
    .await;
    assert_eq!(
        exercise,
        json!({
            "id": id,
            "username": "alice",
            "date": "Sun Jan 01 2023",
            "duration": 30,
            "description": "run",
        })
    );

    let log = send_json(&app, get(&format!("/api/users/{id}/logs"))).await;
    assert_eq!(
        log,
        json!({
            "id": id,
            "username": "alice",
            "count": 1,
            "log": [{ "description": "run", "duration": 30, "date": "Sun Jan 01 2023" }],
        })
    );
}

#[tokio::test]
async fn test_form_bodies_are_accepted() {
    let app = test_app();

    let user = send_json(&app, post_form("/api/users", "username=bob")).await;
    assert_eq!(user["username"], "bob");
    let id = user["id"].as_str().unwrap();

    let exercise = send_json(
        &app,
        post_form(
            &format!("/api/users/{id}/exercises"),
            "description=pushups&duration=15&date=2023-02-14",
        ),
    )
    .await;
    assert_eq!(exercise["duration"], 15);
    assert_eq!(exercise["date"], "Tue Feb 14 2023");
}

#[tokio::test]
async fn test_errors_are_json_with_ok_status() {
    let app = test_app();

    let missing = send_json(&app, post_json("/api/users", json!({}))).await;
    assert_eq!(missing, json!({ "error": "username field does not exist" }));

    let empty = send_json(&app, post_form("/api/users", "username=")).await;
    assert_eq!(empty, json!({ "error": "username input required" }));

    let no_body = send_json(&app, Request::post("/api/users").body(Body::empty()).unwrap()).await;
    assert_eq!(no_body, json!({ "error": "username field does not exist" }));

    let malformed = send_json(
        &app,
        Request::post("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert!(malformed["error"].is_string());

    assert!(send_json(&app, get("/api/users")).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_exercise_for_unknown_user() {
    let app = test_app();

    let reply = send_json(
        &app,
        post_json(
            "/api/users/00000000-0000-0000-0000-000000000000/exercises",
            json!({ "description": "run", "duration": 30 }),
        ),
    )
    .await;
    assert_eq!(reply, json!({ "error": "user does not exist" }));

    let reply = send_json(&app, get("/api/users/nope/logs")).await;
    assert_eq!(reply, json!({ "error": "user does not exist" }));

    assert_eq!(app.db.exercise_count().await, 0);
}

#[tokio::test]
async fn test_exercise_field_errors() {
    let app = test_app();
    let id = create_user(&app, "carol").await;
    let uri = format!("/api/users/{id}/exercises");

    let reply = send_json(&app, post_json(&uri, json!({ "duration": 10 }))).await;
    assert_eq!(reply, json!({ "error": "description field does not exist" }));

    let reply = send_json(&app, post_json(&uri, json!({ "description": "run", "duration": "" }))).await;
    assert_eq!(reply, json!({ "error": "duration input required" }));

    let reply = send_json(&app, post_json(&uri, json!({ "description": "run", "duration": -3 }))).await;
    assert_eq!(
        reply,
        json!({ "error": "duration must be a number of at least 1" })
    );

    let reply = send_json(&app, post_json(&uri, json!({ "description": "run", "duration": "0.5" }))).await;
    assert_eq!(
        reply,
        json!({ "error": "duration must be a number of at least 1" })
    );
}

#[tokio::test]
async fn test_fractional_duration_round_trips() {
    let app = test_app();
    let id = create_user(&app, "heidi").await;

    let exercise = send_json(
        &app,
        post_form(
            &format!("/api/users/{id}/exercises"),
            "description=walk&duration=2.5&date=2023-03-01",
        ),
    )
    .await;
    assert_eq!(exercise["duration"], json!(2.5));

    let log = send_json(&app, get(&format!("/api/users/{id}/logs"))).await;
    assert_eq!(log["log"][0]["duration"], json!(2.5));
}

#[tokio::test]
async fn test_unparseable_date_is_reported_as_invalid() {
    let app = test_app();
    let id = create_user(&app, "dave").await;

    let reply = send_json(
        &app,
        post_json(
            &format!("/api/users/{id}/exercises"),
            json!({ "description": "stretch", "duration": 5, "date": "not a date" }),
        ),
    )
    .await;
    assert_eq!(reply["date"], "Invalid Date");
}

#[tokio::test]
async fn test_log_range_and_limit() {
    let app = test_app();
    let id = create_user(&app, "erin").await;
    let uri = format!("/api/users/{id}/exercises");
    for (description, date) in [
        ("a", "2023-01-01"),
        ("b", "2023-01-10"),
        ("c", "2023-01-20"),
        ("d", "2023-02-01"),
    ] {
        send_json(
            &app,
            post_json(&uri, json!({ "description": description, "duration": 10, "date": date })),
        )
        .await;
    }

    let log = send_json(
        &app,
        get(&format!("/api/users/{id}/logs?from=2023-01-05&to=2023-01-31")),
    )
    .await;
    assert_eq!(log["from"], "Thu Jan 05 2023");
    assert_eq!(log["to"], "Tue Jan 31 2023");
    assert_eq!(log["count"], 2);
    assert_eq!(log["log"][0]["description"], "b");
    assert_eq!(log["log"][1]["description"], "c");

    let limited = send_json(&app, get(&format!("/api/users/{id}/logs?limit=1"))).await;
    assert_eq!(limited["count"], 1);
    assert_eq!(limited["log"][0]["description"], "a");
    assert!(limited.get("from").is_none());
    assert!(limited.get("to").is_none());
}

#[tokio::test]
async fn test_list_users() {
    let app = test_app();
    let first = create_user(&app, "frank").await;
    let second = create_user(&app, "grace").await;

    let users = send_json(&app, get("/api/users")).await;
    assert_eq!(
        users,
        json!([
            { "username": "frank", "id": first },
            { "username": "grace", "id": second },
        ])
    );
}

#[tokio::test]
async fn test_landing_page_and_static_assets() {
    let app = test_app();

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), "<h1>Exercise tracker</h1>");

    let (status, body) = send(&app, get("/style.css")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("color: red"));

    let (status, _) = send(&app, get("/missing.js")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app();

    let doc = send_json(&app, get("/api-docs/openapi.json")).await;
    assert!(doc["paths"]["/api/users"].is_object());
    assert!(doc["paths"]["/api/users/{user_id}/logs"].is_object());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/api/users")
                .header(header::ORIGIN, "https://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
