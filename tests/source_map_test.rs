use axum::{
    Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use helium_frontend_release::services::source_maps::{
    RollbarUploader, SourceMapUpload, SourceMapUploader,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct ReceivedField {
    name: String,
    file_name: Option<String>,
    data: Vec<u8>,
}

type Received = Arc<Mutex<Vec<ReceivedField>>>;

async fn capture(received: &Received, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        received.lock().unwrap().push(ReceivedField {
            name,
            file_name,
            data,
        });
    }
}

async fn accept(State(received): State<Received>, multipart: Multipart) -> (StatusCode, String) {
    capture(&received, multipart).await;
    (StatusCode::OK, r#"{"err":0,"result":{}}"#.to_string())
}

async fn reject(State(received): State<Received>, multipart: Multipart) -> (StatusCode, String) {
    capture(&received, multipart).await;
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"err":1,"message":"invalid access token"}"#.to_string(),
    )
}

async fn spawn_endpoint() -> (SocketAddr, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/1/sourcemap", post(accept))
        .route("/rejecting/sourcemap", post(reject))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, received)
}

fn field<'a>(fields: &'a [ReceivedField], name: &str) -> &'a ReceivedField {
    fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("missing multipart field {}", name))
}

#[tokio::test]
async fn test_rollbar_uploader_sends_multipart_form() {
    let (addr, received) = spawn_endpoint().await;
    let staging = tempfile::tempdir().unwrap();
    let map_path = staging.path().join("app.min.js.map");
    let map_body = br#"{"version":3,"file":"app.min.js","mappings":"AAAA"}"#;
    tokio::fs::write(&map_path, map_body).await.unwrap();

    let uploader = RollbarUploader::new(
        reqwest::Client::new(),
        format!("http://{}/api/1/sourcemap", addr),
    );
    let response = uploader
        .upload(&SourceMapUpload {
            access_token: "rollbar-token".to_string(),
            version: "latest".to_string(),
            minified_url: "https://www.staging.heliumedu.com/assets/js/app.min.js".to_string(),
            source_map_path: map_path,
        })
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(response.body, r#"{"err":0,"result":{}}"#);

    let fields = received.lock().unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(field(&fields, "access_token").data, b"rollbar-token");
    assert_eq!(field(&fields, "version").data, b"latest");
    assert_eq!(
        field(&fields, "minified_url").data,
        b"https://www.staging.heliumedu.com/assets/js/app.min.js"
    );

    let source_map = field(&fields, "source_map");
    assert_eq!(source_map.data, map_body);
    assert!(source_map.file_name.is_some());
}

#[tokio::test]
async fn test_rollbar_uploader_reports_rejection_without_error() {
    let (addr, _received) = spawn_endpoint().await;
    let staging = tempfile::tempdir().unwrap();
    let map_path = staging.path().join("app.min.js.map");
    tokio::fs::write(&map_path, b"{}").await.unwrap();

    let uploader = RollbarUploader::new(
        reqwest::Client::new(),
        format!("http://{}/rejecting/sourcemap", addr),
    );
    let response = uploader
        .upload(&SourceMapUpload {
            access_token: "bad-token".to_string(),
            version: "latest".to_string(),
            minified_url: "https://www.heliumedu.com/assets/js/app.min.js".to_string(),
            source_map_path: map_path,
        })
        .await
        .unwrap();

    assert_eq!(response.status, 422);
    assert!(!response.is_success());
    assert!(response.body.contains("invalid access token"));
}

#[tokio::test]
async fn test_rollbar_uploader_fails_on_missing_staged_file() {
    let staging = tempfile::tempdir().unwrap();
    let uploader = RollbarUploader::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9/api/1/sourcemap".to_string(),
    );

    let result = uploader
        .upload(&SourceMapUpload {
            access_token: "rollbar-token".to_string(),
            version: "latest".to_string(),
            minified_url: "https://www.heliumedu.com/assets/js/app.min.js".to_string(),
            source_map_path: staging.path().join("missing.min.js.map"),
        })
        .await;

    assert!(result.is_err());
}
