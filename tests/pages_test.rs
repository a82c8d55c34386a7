mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::*;
use tower::ServiceExt;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_index_page() {
    let app = TestApp::new(None, None);

    let response = app.router.clone().oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    let html = text_body(response).await;
    assert!(html.contains("/api/transcribe"));
    assert!(html.contains("form.append('audio'"));
}

#[tokio::test]
async fn test_api_docs_uses_request_host() {
    let app = TestApp::new(None, None);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/docs")
                .header(header::HOST, "stt.example.com")
                .header("x-forwarded-proto", "https")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains("https://stt.example.com/api/transcribe"));
    assert!(!html.contains("{{ base_url }}"));
}

#[tokio::test]
async fn test_health_reports_collaborators() {
    let mock = MockRecognizer::new(Recognition::Text("unused"));
    let app = TestApp::new(recognizer(&mock), refiner(EchoRefiner));

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["recognizer"], "available");
    assert_eq!(json["refiner"], "enabled");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_degraded_without_recognizer() {
    let app = TestApp::new(None, None);

    let response = app.router.clone().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["recognizer"], "unavailable");
    assert_eq!(json["refiner"], "disabled");
}

#[tokio::test]
async fn test_openapi_lists_transcription_routes() {
    let app = TestApp::new(None, None);

    let response = app
        .router
        .clone()
        .oneshot(get("/api-docs/openapi.json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["paths"]["/api/transcribe"]["post"].is_object());
    assert!(json["paths"]["/transcribe"]["post"].is_object());
    assert!(json["paths"]["/health"]["get"].is_object());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new(None, None);

    let response = app.router.clone().oneshot(get("/uploads")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
