//! Router-level tests that need no backend.

mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use gateway::AppState;
use gateway::config::GatewayConfig;
use gateway::startup::build_router;
use service_core::grpc::CalcClient;
use tower::util::ServiceExt;

async fn router() -> axum::Router {
    let config = GatewayConfig::for_tests(common::unused_port().await);
    let calc_client = CalcClient::new_lazy(config.backend.client_config()).unwrap();
    build_router(AppState::new(config, calc_client))
}

#[tokio::test]
async fn root_returns_empty_ok_for_any_method() {
    let app = router().await;

    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::GET] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{method}");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty(), "{method}");
    }
}

#[tokio::test]
async fn health_check_works() {
    let response = router()
        .await
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "gateway-test");
}

#[tokio::test]
async fn bad_val_never_reaches_backend() {
    let response = router()
        .await
        .oneshot(
            Request::builder()
                .uri("/increment?val=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_val_is_json_bad_request() {
    let response = router()
        .await
        .oneshot(
            Request::builder()
                .uri("/increment?val=1&val=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("invalid query string"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let response = router()
        .await
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
