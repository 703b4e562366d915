use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
};
use ecoledirecte_proxy::{build_router, AppState};
use std::path::PathBuf;
use tower::ServiceExt;

use super::common::{client, spawn_proxy, test_config, MockUpstream};

fn assert_preflight_headers(headers: &axum::http::HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
}

#[tokio::test]
async fn options_on_any_path_is_answered_locally() {
    let upstream = MockUpstream::start(500, "application/json", "{}").await;
    let static_root = tempfile::tempdir().unwrap();
    let app = build_router(
        AppState::new(test_config(upstream.base_url(), static_root.path().to_path_buf())).unwrap(),
    );

    for path in ["/api/login.awp", "/api/", "/index.html", "/", "/does/not/exist"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(path)
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200, "path {}", path);
        assert_preflight_headers(response.headers());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty(), "path {}", path);
    }

    assert_eq!(upstream.call_count(), 0);
}

#[tokio::test]
async fn preflight_over_the_wire() {
    let upstream = MockUpstream::start(200, "application/json", "{}").await;
    let proxy = spawn_proxy(test_config(upstream.base_url(), PathBuf::from("."))).await;

    let response = client()
        .request(reqwest::Method::OPTIONS, format!("{}/api/login.awp", proxy))
        .header("origin", "http://127.0.0.1:8080")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_preflight_headers(response.headers());
    assert!(response.bytes().await.unwrap().is_empty());
    assert_eq!(upstream.call_count(), 0);
}
