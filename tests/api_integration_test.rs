mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::memory_store;
use http_body_util::BodyExt;
use rust_file_drop::config::DropConfig;
use rust_file_drop::services::drop_service::DropService;
use rust_file_drop::services::identity::IdentityMode;
use rust_file_drop::{AppState, create_app};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

fn app_with(config: DropConfig) -> Router {
    let service = DropService::from_config(memory_store(), &config).unwrap();
    create_app(AppState {
        service: Arc::new(service),
        config,
    })
}

fn app(mode: IdentityMode) -> Router {
    app_with(DropConfig {
        identity_mode: mode,
        ..DropConfig::development()
    })
}

fn multipart_body(filename: &str, content: &str) -> String {
    format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
        Content-Type: application/octet-stream\r\n\r\n\
        {content}\r\n\
        --{boundary}--\r\n",
        boundary = BOUNDARY,
        filename = filename,
        content = content
    )
}

fn upload_request(filename: &str, content: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder
        .body(Body::from(multipart_body(filename, content)))
        .unwrap()
}

fn get_request(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_password_upload_list_download_flow() {
    let app = app(IdentityMode::Password);
    let auth = [("x-drop-password", "correct horse")];

    // 1. Upload
    let response = app
        .clone()
        .oneshot(upload_request("report.pdf", "0123456789", &auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = json_body(response).await;
    let id = uploaded["id"].as_str().unwrap().to_string();
    let code = uploaded["access_code"].as_str().unwrap().to_string();
    assert_eq!(uploaded["filename"], "report.pdf");
    assert_eq!(uploaded["size"], 10);

    // 2. List
    let response = app
        .clone()
        .oneshot(get_request("/files", &auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());

    // 3. Download with the code
    let response = app
        .clone()
        .oneshot(get_request(&format!("/files/{}?code={}", id, code), &auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"report.pdf\""));
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"0123456789");

    // 4. Wrong code
    let response = app
        .clone()
        .oneshot(get_request(&format!("/files/{}?code=NOPE2345", id), &auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 5. Another password sees nothing and cannot fetch
    let other = [("x-drop-password", "battery staple")];
    let response = app
        .clone()
        .oneshot(get_request("/files", &other))
        .await
        .unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 0);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/files/{}?code={}", id, code), &other))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_foreign_records_can_be_reported_as_forbidden() {
    let app = app_with(DropConfig {
        identity_mode: IdentityMode::Password,
        hide_foreign_records: false,
        ..DropConfig::development()
    });

    let response = app
        .clone()
        .oneshot(upload_request("a.txt", "a", &[("x-drop-password", "one")]))
        .await
        .unwrap();
    let uploaded = json_body(response).await;
    let uri = format!(
        "/files/{}?code={}",
        uploaded["id"].as_str().unwrap(),
        uploaded["access_code"].as_str().unwrap()
    );

    let response = app
        .oneshot(get_request(&uri, &[("x-drop-password", "two")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_password_mode_without_header_is_unauthorized() {
    let app = app(IdentityMode::Password);
    let response = app.oneshot(get_request("/files", &[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_is_minted_and_honoured() {
    let app = app(IdentityMode::Session);

    let response = app
        .clone()
        .oneshot(upload_request("note.txt", "hello", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("drop_session="));
    assert!(set_cookie.contains("Max-Age=604800"));
    assert!(set_cookie.contains("HttpOnly"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let uploaded = json_body(response).await;

    // Same cookie: file is listed and no new cookie is issued
    let response = app
        .clone()
        .oneshot(get_request("/files", &[("cookie", cookie.as_str())]))
        .await
        .unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let listed = json_body(response).await;
    assert_eq!(listed[0]["id"], uploaded["id"]);

    // No cookie: a fresh session with nothing in it
    let response = app
        .clone()
        .oneshot(get_request("/files", &[]))
        .await
        .unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_some());
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_missing_file_field_is_bad_request() {
    let app = app(IdentityMode::Open);
    let body = format!(
        "--{boundary}\r\n\
        Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
        no file here\r\n\
        --{boundary}--\r\n",
        boundary = BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No file selected");
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    let app = app(IdentityMode::Open);
    let response = app
        .oneshot(get_request("/files/nope?code=ABCDEFGH", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = app(IdentityMode::Open);
    let response = app
        .oneshot(get_request("/health", &[("x-request-id", "req-42")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");

    let health = json_body(response).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["identity_mode"], "open");
    assert_eq!(health["retention_secs"], 3600);
}

#[tokio::test]
async fn test_blank_file_picker_is_bad_request() {
    let app = app(IdentityMode::Open);
    let response = app
        .oneshot(upload_request("", "", &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "No file selected");
}
