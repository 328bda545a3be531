//! Router tests against a mock B2 service.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use vidhost_storage::{B2Client, B2Config};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::ApiConfig;
use crate::routes::create_router;
use crate::state::AppState;

// =============================================================================
// Test Helpers
// =============================================================================

const BOUNDARY: &str = "vidhost-test-boundary";

fn app(server: &MockServer, config: ApiConfig) -> Router {
    let mut b2 = B2Config::new("key-id", "secret", "demo");
    b2.auth_url = server.uri();
    let client = B2Client::new(b2).unwrap();
    create_router(AppState::with_client(config, client), None)
}

async fn mount_healthy_storage(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/b2api/v2/b2_authorize_account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accountId": "acct-1",
            "authorizationToken": "tok-1",
            "apiUrl": server.uri(),
            "downloadUrl": server.uri()
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/b2api/v2/b2_list_buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "buckets": [{"bucketId": "bucket-1", "bucketName": "demo"}]
        })))
        .mount(server)
        .await;
}

async fn mount_rejected_credentials(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/b2api/v2/b2_authorize_account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": 401,
            "code": "unauthorized",
            "message": "invalid application key"
        })))
        .mount(server)
        .await;
}

async fn mount_files(server: &MockServer, files: Value) {
    Mock::given(method("POST"))
        .and(path("/b2api/v2/b2_list_file_names"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": files,
            "nextFileName": null
        })))
        .mount(server)
        .await;
}

fn file_entry(id: &str, name: &str, ts: i64) -> Value {
    json!({
        "action": "upload",
        "contentLength": 10,
        "fileId": id,
        "fileName": name,
        "uploadTimestamp": ts
    })
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value)
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn assert_no_storage_calls(server: &MockServer) {
    assert!(server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_sets_common_headers() {
    let server = MockServer::start().await;
    let response = app(&server, ApiConfig::default())
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["X-Content-Type-Options"], "nosniff");
    assert!(response.headers().contains_key("X-Request-ID"));

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_no_storage_calls(&server).await;
}

#[tokio::test]
async fn test_ready_reflects_storage() {
    let server = MockServer::start().await;
    mount_healthy_storage(&server).await;
    let response = app(&server, ApiConfig::default()).oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let server = MockServer::start().await;
    mount_rejected_credentials(&server).await;
    let response = app(&server, ApiConfig::default()).oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["checks"]["storage"]["error"], "authentication");
}

#[tokio::test]
async fn test_ready_notices_storage_outage_after_success() {
    let server = MockServer::start().await;
    mount_healthy_storage(&server).await;
    let app = app(&server, ApiConfig::default());

    let response = app.clone().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    server.reset().await;
    mount_rejected_credentials(&server).await;
    Mock::given(method("POST"))
        .and(path("/b2api/v2/b2_list_buckets"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = app.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_videos_newest_first() {
    let server = MockServer::start().await;
    mount_healthy_storage(&server).await;
    mount_files(
        &server,
        json!([
            file_entry("id-clip", "video_1000_clip.mp4", 1000),
            file_entry("id-notes", "notes.txt", 2000),
            file_entry("id-trip", "video_3000_trip.mov", 3000)
        ]),
    )
    .await;

    let response = app(&server, ApiConfig::default())
        .oneshot(get("/api/videos"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let videos = body.as_array().unwrap();
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0]["objectId"], "id-trip");
    assert_eq!(videos[0]["displayTitle"], "trip");
    assert_eq!(videos[0]["uploadDateLabel"], "1970-01-01");
    assert!(videos[0]["viewCount"].is_null());
    assert_eq!(videos[1]["objectId"], "id-clip");
}

#[tokio::test]
async fn test_list_videos_is_empty_when_storage_fails() {
    let server = MockServer::start().await;
    mount_rejected_credentials(&server).await;

    let response = app(&server, ApiConfig::default())
        .oneshot(get("/api/videos"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_get_video_by_id() {
    let server = MockServer::start().await;
    mount_healthy_storage(&server).await;
    mount_files(&server, json!([file_entry("id-clip", "video_1000_clip.mp4", 1000)])).await;
    let app = app(&server, ApiConfig::default());

    let response = app.clone().oneshot(get("/api/videos/id-clip")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["originalName"], "video_1000_clip.mp4");

    let response = app.oneshot(get("/api/videos/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_requires_title() {
    let server = MockServer::start().await;
    let response = app(&server, ApiConfig::default())
        .oneshot(upload_request(&[Part::File {
            name: "video",
            file_name: "clip.mp4",
            content_type: "video/mp4",
            data: b"abc",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Title is required");
    assert_no_storage_calls(&server).await;
}

#[tokio::test]
async fn test_upload_requires_file() {
    let server = MockServer::start().await;
    let response = app(&server, ApiConfig::default())
        .oneshot(upload_request(&[Part::Text("title", "Trip")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Video file is required");
    assert_no_storage_calls(&server).await;
}

#[tokio::test]
async fn test_upload_rejects_non_video() {
    let server = MockServer::start().await;
    let response = app(&server, ApiConfig::default())
        .oneshot(upload_request(&[
            Part::Text("title", "Holiday"),
            Part::File {
                name: "video",
                file_name: "photo.png",
                content_type: "image/png",
                data: b"\x89PNG",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_no_storage_calls(&server).await;
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_before_storage() {
    let server = MockServer::start().await;
    let config = ApiConfig {
        max_upload_bytes: 16,
        ..ApiConfig::default()
    };

    let response = app(&server, config)
        .oneshot(upload_request(&[
            Part::Text("title", "Big"),
            Part::File {
                name: "video",
                file_name: "big.mp4",
                content_type: "video/mp4",
                data: &[0u8; 64],
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_no_storage_calls(&server).await;
}

#[tokio::test]
async fn test_upload_success() {
    let server = MockServer::start().await;
    mount_healthy_storage(&server).await;
    Mock::given(method("POST"))
        .and(path("/b2api/v2/b2_get_upload_url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bucketId": "bucket-1",
            "uploadUrl": format!("{}/upload/pod-1", server.uri()),
            "authorizationToken": "up-1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload/pod-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fileId": "4_znew",
            "fileName": "video_1700000000000_trip.mp4",
            "contentLength": 5,
            "uploadTimestamp": 1700000000000_i64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server, ApiConfig::default())
        .oneshot(upload_request(&[
            Part::Text("title", "Trip"),
            Part::Text("description", "Summer"),
            Part::File {
                name: "video",
                file_name: "trip.mp4",
                content_type: "video/mp4",
                data: b"video",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["objectId"], "4_znew");
    assert_eq!(body["storedFileName"], "video_1700000000000_trip.mp4");
    assert_eq!(body["contentLength"], 5);
    assert_eq!(body["title"], "Trip");
    assert_eq!(
        body["downloadUrl"],
        "https://f005.backblazeb2.com/file/demo/video_1700000000000_trip.mp4"
    );
}

#[tokio::test]
async fn test_upload_storage_failure_is_server_error() {
    let server = MockServer::start().await;
    mount_rejected_credentials(&server).await;

    let response = app(&server, ApiConfig::default())
        .oneshot(upload_request(&[
            Part::Text("title", "Trip"),
            Part::File {
                name: "video",
                file_name: "trip.mp4",
                content_type: "video/mp4",
                data: b"video",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Upload failed: authentication");
}

#[tokio::test]
async fn test_upload_error_detail_follows_configured_environment() {
    let upload = || {
        upload_request(&[
            Part::Text("title", "Trip"),
            Part::File {
                name: "video",
                file_name: "trip.mp4",
                content_type: "video/mp4",
                data: b"video",
            },
        ])
    };
    let server = MockServer::start().await;
    mount_rejected_credentials(&server).await;

    let production = ApiConfig {
        environment: "production".to_string(),
        ..ApiConfig::default()
    };
    let body = json_body(app(&server, production).oneshot(upload()).await.unwrap()).await;
    assert_eq!(body["detail"], "invalid application key");

    let body = json_body(app(&server, ApiConfig::default()).oneshot(upload()).await.unwrap()).await;
    assert!(body["detail"].as_str().unwrap().contains("unauthorized"));
}
