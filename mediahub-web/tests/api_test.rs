use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use mediahub_data::compiler::NoopCompiler;
use mediahub_data::config::{CompilerConfig, Config, Folders};
use mediahub_web::state::AppState;

struct TestServer {
    addr: SocketAddr,
    _dir: TempDir,
    _cancel: CancellationToken,
}

/// Start the full server (router + download worker) on a random port
/// with a temp-dir database and a no-op compiler.
async fn start_test_server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    let config = Config {
        frontend_url: "https://media.example.com".to_string(),
        static_url: "https://static.example.com".to_string(),
        cdn_url: "https://cdn.example.com".to_string(),
        http_port: 0,
        database_path: base.join("test.db"),
        folders: Folders {
            images_base_dir: base.join("images"),
            images_webroot: "/static".to_string(),
            recordings_base_dir: base.join("recordings"),
            recordings_webroot: "/recordings".to_string(),
        },
        compiler: CompilerConfig::default(),
    };

    let (tx, rx) = mpsc::channel(16);
    let state = AppState::open(
        &base.join("test.db"),
        config,
        Arc::new(NoopCompiler),
        tx,
    )
    .unwrap();

    let cancel = CancellationToken::new();
    mediahub_web::downloader::spawn(state.clone(), rx, cancel.clone());

    let app = mediahub_web::build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr,
        _dir: dir,
        _cancel: cancel,
    }
}

/// Serve a fake schedule document on a random port.
async fn start_schedule_stub() -> SocketAddr {
    let app = Router::new().route(
        "/schedule.xml",
        get(|| async { "<schedule><conference/></schedule>" }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn create_conference(client: &reqwest::Client, addr: SocketAddr, acronym: &str) -> Value {
    let response = client
        .post(format!("http://{}/api/conferences", addr))
        .json(&json!({ "acronym": acronym, "slug": acronym }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    response.json().await.unwrap()
}

async fn get_conference(client: &reqwest::Client, addr: SocketAddr, id: i64) -> Value {
    let response = client
        .get(format!("http://{}/api/conferences/{}", addr, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.json().await.unwrap()
}

/// Poll until the conference reaches the expected schedule state or the
/// timeout elapses. Returns the last observed state.
async fn wait_for_state(
    client: &reqwest::Client,
    addr: SocketAddr,
    id: i64,
    expected: &str,
    timeout: Duration,
) -> String {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let body = get_conference(client, addr, id).await;
        let state = body["schedule_state"].as_str().unwrap_or_default().to_string();
        if state == expected || tokio::time::Instant::now() >= deadline {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = start_test_server().await;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/api/health", server.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_conference_starts_not_present() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let body = create_conference(&client, server.addr, "frab23").await;
    assert_eq!(body["schedule_state"], "not_present");
    assert_eq!(body["display_name"], "frab23");
    assert!(body["logo_url"]
        .as_str()
        .unwrap()
        .ends_with("/images/logos/unknown.png"));
}

#[tokio::test]
async fn test_duplicate_slug_returns_422() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    create_conference(&client, server.addr, "frab23").await;

    let response = client
        .post(format!("http://{}/api/conferences", server.addr))
        .json(&json!({ "acronym": "other", "slug": "frab23" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "slug");
}

#[tokio::test]
async fn test_missing_acronym_returns_422() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/conferences", server.addr))
        .json(&json!({ "acronym": "", "slug": "frab23" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "acronym");
}

#[tokio::test]
async fn test_schedule_download_end_to_end() {
    let server = start_test_server().await;
    let stub = start_schedule_stub().await;
    let client = reqwest::Client::new();

    let body = create_conference(&client, server.addr, "frab23").await;
    let id = body["id"].as_i64().unwrap();

    let response = client
        .put(format!(
            "http://{}/api/conferences/{}/schedule",
            server.addr, id
        ))
        .json(&json!({ "schedule_url": format!("http://{}/schedule.xml", stub) }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["schedule_state"], "downloading");

    // The worker fetches the stub document and finishes the download.
    let state = wait_for_state(
        &client,
        server.addr,
        id,
        "downloaded",
        Duration::from_secs(5),
    )
    .await;
    assert_eq!(state, "downloaded");
}

#[tokio::test]
async fn test_schedule_update_without_url_stays_downloading() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let body = create_conference(&client, server.addr, "frab23").await;
    let id = body["id"].as_i64().unwrap();

    let response = client
        .put(format!(
            "http://{}/api/conferences/{}/schedule",
            server.addr, id
        ))
        .json(&json!({ "schedule_url": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["schedule_state"], "downloading");

    // Nothing was queued, so the state never advances.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let body = get_conference(&client, server.addr, id).await;
    assert_eq!(body["schedule_state"], "downloading");
}

#[tokio::test]
async fn test_failed_fetch_leaves_record_downloading() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let body = create_conference(&client, server.addr, "frab23").await;
    let id = body["id"].as_i64().unwrap();

    // Unroutable target: the fetch fails and no retry exists.
    client
        .put(format!(
            "http://{}/api/conferences/{}/schedule",
            server.addr, id
        ))
        .json(&json!({ "schedule_url": "http://127.0.0.1:1/schedule.xml" }))
        .send()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    let body = get_conference(&client, server.addr, id).await;
    assert_eq!(body["schedule_state"], "downloading");
}

#[tokio::test]
async fn test_finish_download_conflict_when_not_downloading() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let body = create_conference(&client, server.addr, "frab23").await;
    let id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!(
            "http://{}/api/conferences/{}/finish-download",
            server.addr, id
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 409);

    let body = get_conference(&client, server.addr, id).await;
    assert_eq!(body["schedule_state"], "not_present");
}

#[tokio::test]
async fn test_delete_conference_cascades_events() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let body = create_conference(&client, server.addr, "frab23").await;
    let id = body["id"].as_i64().unwrap();

    let response = client
        .delete(format!("http://{}/api/conferences/{}", server.addr, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!(
            "http://{}/api/conferences/{}/events",
            server.addr, id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_show_tag_returns_success() {
    let server = start_test_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/api/tags/123", server.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["tag"], "123");
}
