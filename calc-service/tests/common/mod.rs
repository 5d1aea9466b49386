//! Common test utilities for calc-service integration tests.

use calc_service::config::CalcConfig;
use calc_service::grpc::proto::calc_client::CalcClient;
use calc_service::startup::Application;
use std::time::Duration;
use tonic::transport::Channel;

pub struct TestApp {
    pub http_address: String,
    pub grpc_address: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(CalcConfig::for_tests()).await
    }

    pub async fn spawn_with_config(config: CalcConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let http_address = format!("http://127.0.0.1:{}", app.http_port());
        let grpc_address = format!("http://127.0.0.1:{}", app.grpc_port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if let Ok(response) = client
                .get(format!("{}/health", http_address))
                .send()
                .await
                && response.status().is_success()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Self {
            http_address,
            grpc_address,
        }
    }

    pub async fn grpc_client(&self) -> CalcClient<Channel> {
        for _ in 0..5 {
            if let Ok(client) = CalcClient::connect(self.grpc_address.clone()).await {
                return client;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        CalcClient::connect(self.grpc_address.clone())
            .await
            .expect("Failed to connect to gRPC server")
    }
}
