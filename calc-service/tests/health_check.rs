//! HTTP probe tests for calc-service.

mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_returns_ok() {
    let app = TestApp::spawn().await;

    let response = reqwest::get(format!("{}/health", app.http_address))
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "calc-service-test");
}

#[tokio::test]
async fn readiness_check_returns_ok() {
    let app = TestApp::spawn().await;

    let response = reqwest::get(format!("{}/ready", app.http_address))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn metrics_exposes_grpc_counters() {
    let app = TestApp::spawn().await;
    let mut client = app.grpc_client().await;
    client
        .increment(calc_service::grpc::proto::NumRequest { val: 1 })
        .await
        .unwrap();

    let body = reqwest::get(format!("{}/metrics", app.http_address))
        .await
        .expect("Failed to send request")
        .text()
        .await
        .unwrap();

    assert!(body.contains("calc_grpc_requests_total"));
}

#[tokio::test]
async fn shutdown_flips_readiness_and_stops_servers() {
    use calc_service::config::CalcConfig;
    use calc_service::startup::Application;
    use tokio::sync::oneshot;

    let app = Application::build(CalcConfig::for_tests()).await.unwrap();
    let http_address = format!("http://127.0.0.1:{}", app.http_port());
    let (tx, rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(app.run_with_shutdown(async move {
        rx.await.ok();
    }));

    let client = reqwest::Client::new();
    let mut ready = false;
    for _ in 0..50 {
        if let Ok(r) = client.get(format!("{}/ready", http_address)).send().await
            && r.status().is_success()
        {
            ready = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(ready, "service never became ready");

    drop(client);
    tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .expect("servers did not drain in time")
        .unwrap();
    assert!(result.is_ok());
}
