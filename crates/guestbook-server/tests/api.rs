//! HTTP API tests against the full router.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Local, TimeDelta, TimeZone};
use guestbook_core::controller::SUBMIT_FAILED_MESSAGE;
use guestbook_core::error::EMPTY_ANSWER_MESSAGE;
use guestbook_core::layout::Viewport;
use guestbook_core::safe_io::atomic_write_json;
use guestbook_core::{
    ArchivalStore, Entry, HttpClient, NewEntry, StorageConfig, StoreHandle, StorePaths,
    UiController,
};
use guestbook_server::router;
use guestbook_server::routes::AppState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceExt;

fn open_store(dir: &Path, cap: usize) -> ArchivalStore {
    ArchivalStore::open(
        dir,
        StorageConfig {
            max_active_entries: Some(cap),
            anonymous_name: None,
        },
    )
    .unwrap()
}

fn app(handle: &StoreHandle) -> Router {
    router(AppState::new(handle.clone()), None)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(body: Value) -> Request<Body> {
    Request::post("/api/guestbook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Writes `count` entries straight into the active log, newest first.
fn seed_active_log(store: &ArchivalStore, count: usize) -> Vec<Entry> {
    let start = Local.timestamp_millis_opt(1_735_689_600_000).unwrap();
    let mut log: Vec<Entry> = Vec::with_capacity(count);
    for i in 0..count {
        let answer = format!("seed {i}");
        let entry = NewEntry::parse(None, Some(answer.as_str()), "익명")
            .unwrap()
            .into_entry(start + TimeDelta::seconds(i as i64), log.first());
        log.insert(0, entry);
    }
    atomic_write_json(&store.active_log_file(), &log).unwrap();
    log
}

#[tokio::test]
async fn integration_list_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let handle = StoreHandle::spawn(open_store(temp_dir.path(), 10)).unwrap();

    let (status, body) = send(app(&handle), get("/api/guestbook")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn integration_post_then_list_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let handle = StoreHandle::spawn(open_store(temp_dir.path(), 10)).unwrap();

    let (status, body) = send(app(&handle), post_json(json!({ "answer": "첫 번째" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["entry"]["name"], json!("익명"));
    assert_eq!(body["entry"]["answer"], json!("첫 번째"));
    assert!(body["entry"]["createdAt"].is_string());
    assert!(body["entry"]["displayDate"].is_string());

    let (_, body) = send(
        app(&handle),
        post_json(json!({ "name": "  민수 ", "answer": " 두 번째 " })),
    )
    .await;
    assert_eq!(body["entry"]["name"], json!("민수"));

    let (_, list) = send(app(&handle), get("/api/guestbook")).await;
    let answers: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["answer"].as_str().unwrap())
        .collect();
    assert_eq!(answers, vec!["두 번째", "첫 번째"]);
}

#[tokio::test]
async fn integration_post_rejects_blank_answer() {
    let temp_dir = TempDir::new().unwrap();
    let handle = StoreHandle::spawn(open_store(temp_dir.path(), 10)).unwrap();

    let (status, body) = send(app(&handle), post_json(json!({ "name": "", "answer": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": EMPTY_ANSWER_MESSAGE }));

    let (status, _) = send(app(&handle), post_json(json!({ "name": "민수" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn integration_post_rejects_unreadable_body_as_json_error() {
    let temp_dir = TempDir::new().unwrap();
    let handle = StoreHandle::spawn(open_store(temp_dir.path(), 10)).unwrap();

    let malformed = Request::post("/api/guestbook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(app(&handle), malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!(EMPTY_ANSWER_MESSAGE));

    let no_body = Request::post("/api/guestbook").body(Body::empty()).unwrap();
    let (status, body) = send(app(&handle), no_body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(handle.list().await.is_empty());
}

#[tokio::test]
async fn integration_write_failure_returns_generic_error() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 10);
    // A directory where the active log should be makes every rename fail.
    std::fs::remove_file(store.active_log_file()).unwrap();
    std::fs::create_dir(store.active_log_file()).unwrap();
    let handle = StoreHandle::spawn(store).unwrap();

    let (status, body) = send(app(&handle), post_json(json!({ "answer": "hi" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": SUBMIT_FAILED_MESSAGE }));
}

#[tokio::test]
async fn integration_layout_endpoint_places_newest_entries() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 100);
    let seeded = seed_active_log(&store, 15);
    let handle = StoreHandle::spawn(store).unwrap();

    let (status, body) = send(
        app(&handle),
        get("/api/guestbook/layout?width=1280&height=900&headerBottom=120"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let placements = body.as_array().unwrap();
    assert_eq!(placements.len(), 12);
    assert_eq!(placements[0]["entryId"], json!(seeded[0].id));
    for placement in placements {
        let x = placement["x"].as_f64().unwrap();
        assert!((0.0..=1280.0).contains(&x));
        assert!(placement["color"]["bg"].is_string());
    }
}

#[tokio::test]
async fn integration_layout_endpoint_requires_dimensions() {
    let temp_dir = TempDir::new().unwrap();
    let handle = StoreHandle::spawn(open_store(temp_dir.path(), 10)).unwrap();

    let (status, body) = send(app(&handle), get("/api/guestbook/layout?width=800")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn integration_cap_boundary_archives_exactly_one_entry() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(temp_dir.path(), 2000);
    let archive_dir = store.archive_dir();
    let seeded = seed_active_log(&store, 1999);
    let oldest_id = seeded.last().unwrap().id.clone();
    let handle = StoreHandle::spawn(store).unwrap();

    let (status, _) = send(app(&handle), post_json(json!({ "answer": "테스트" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(handle.list().await.len(), 2000);
    assert!(handle.store().archive_chunks().unwrap().is_empty());
    assert!(!archive_dir.exists() || archive_dir.read_dir().unwrap().next().is_none());

    let (status, _) = send(app(&handle), post_json(json!({ "answer": "테스트" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(handle.list().await.len(), 2000);

    let chunks = handle.store().archive_chunks().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].entries, 1);

    let history = handle.store().history().unwrap();
    assert_eq!(history.len(), 2001);
    assert_eq!(history.last().unwrap().id, oldest_id);
}

#[tokio::test]
async fn integration_controller_round_trip_over_http() {
    let temp_dir = TempDir::new().unwrap();
    let handle = StoreHandle::spawn(open_store(temp_dir.path(), 50)).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app(&handle))
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });

    let client = HttpClient::new(&format!("http://{addr}"));
    let mut ui = UiController::new(client, "익명", Viewport::new(1280.0, 900.0));
    let ms = Duration::from_millis;

    // Nothing stored yet: the board stays empty.
    ui.load_entries(ms(0)).await;
    assert!(ui.board().is_empty());

    let stored = ui.handle_submit("반갑습니다", ms(10)).await.unwrap();
    assert_eq!(stored.name, "익명");
    assert_eq!(ui.board().len(), 1);
    assert_eq!(ui.entries()[0].id, stored.id);

    let view = ui.view();
    assert_eq!(view.len(), 1);
    assert!(view[0].inner_html.contains("반갑습니다"));
    assert!(!view[0].inner_html.contains("bubble-name"));

    assert!(ui.handle_submit("  ", ms(20)).await.is_none());
    assert_eq!(ui.message().unwrap().text, EMPTY_ANSWER_MESSAGE);

    ui.load_entries(ms(30)).await;
    assert_eq!(ui.board().len(), 1);

    shutdown_tx.send(()).ok();
    server.await.unwrap();
}
