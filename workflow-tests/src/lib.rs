//! Cross-service workflow integration tests library.
//!
//! Drives the gateway over HTTP and calc-service over gRPC. By default both
//! services are started in-process on free ports. Set `GATEWAY_URL` (and
//! optionally `CALC_GRPC_ENDPOINT`, `CALC_HEALTH_URL`) to run the same tests
//! against an already running deployment instead.
//!
//! ```bash
//! GATEWAY_URL=http://localhost:8080 cargo test -p workflow-tests
//! ```

use anyhow::{Result, anyhow};
use std::sync::Once;
use std::time::Duration;
use tonic::transport::Channel;

pub use service_core::grpc::proto::calc::calc_client::CalcClient as CalcServiceClient;

pub mod proto {
    pub use service_core::grpc::proto::calc::*;
}

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Where the services under test live.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub gateway: String,
    pub calc_grpc: String,
    pub calc_health: String,
}

impl ServiceEndpoints {
    /// Endpoints of an external deployment, if `GATEWAY_URL` is set.
    pub fn from_env() -> Option<Self> {
        let gateway = std::env::var("GATEWAY_URL").ok()?;
        Some(Self {
            gateway,
            calc_grpc: std::env::var("CALC_GRPC_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            calc_health: std::env::var("CALC_HEALTH_URL")
                .unwrap_or_else(|_| "http://localhost:8001/health".to_string()),
        })
    }

    /// Start calc-service and a gateway in front of it, both on free ports.
    pub async fn spawn_in_process() -> Result<Self> {
        let calc = calc_service::startup::Application::build(
            calc_service::config::CalcConfig::for_tests(),
        )
        .await
        .map_err(|e| anyhow!("Failed to build calc-service: {}", e))?;
        let calc_grpc_port = calc.grpc_port();
        let calc_http_port = calc.http_port();
        tokio::spawn(async move {
            if let Err(e) = calc.run_until_stopped().await {
                tracing::error!(error = %e, "calc-service stopped");
            }
        });

        let gateway = gateway::startup::Application::build(
            gateway::config::GatewayConfig::for_tests(calc_grpc_port),
        )
        .await
        .map_err(|e| anyhow!("Failed to build gateway: {}", e))?;
        let gateway_port = gateway.port();
        tokio::spawn(async move {
            if let Err(e) = gateway.run_until_stopped().await {
                tracing::error!(error = %e, "gateway stopped");
            }
        });

        Ok(Self {
            gateway: format!("http://127.0.0.1:{}", gateway_port),
            calc_grpc: format!("http://127.0.0.1:{}", calc_grpc_port),
            calc_health: format!("http://127.0.0.1:{}/health", calc_http_port),
        })
    }

    pub fn health_urls(&self) -> Vec<(&'static str, String)> {
        vec![
            ("gateway", format!("{}/health", self.gateway)),
            ("calc", self.calc_health.clone()),
        ]
    }
}

/// Context for workflow tests: an HTTP client for the gateway and a raw gRPC
/// client for calc-service.
pub struct WorkflowTestContext {
    pub endpoints: ServiceEndpoints,
    pub http: reqwest::Client,
    pub calc: CalcServiceClient<Channel>,
}

impl WorkflowTestContext {
    /// Connect to an external stack if configured, otherwise spawn one.
    pub async fn new() -> Result<Self> {
        init_tracing();

        let endpoints = match ServiceEndpoints::from_env() {
            Some(endpoints) => endpoints,
            None => ServiceEndpoints::spawn_in_process().await?,
        };

        wait_for_services(&endpoints, Duration::from_secs(30)).await?;

        let calc = CalcServiceClient::connect(endpoints.calc_grpc.clone())
            .await
            .map_err(|e| anyhow!("Failed to connect to calc-service: {}", e))?;

        Ok(Self {
            endpoints,
            http: reqwest::Client::new(),
            calc,
        })
    }

    /// `GET /increment?val=<raw>` on the gateway.
    pub async fn gateway_increment(&self, raw: &str) -> Result<reqwest::Response> {
        self.http
            .get(format!("{}/increment", self.endpoints.gateway))
            .query(&[("val", raw)])
            .send()
            .await
            .map_err(|e| anyhow!("Gateway request failed: {}", e))
    }

    /// `Increment(val)` directly on calc-service.
    pub async fn grpc_increment(&self, val: i64) -> std::result::Result<i64, tonic::Status> {
        let mut client = self.calc.clone();
        let response = client.increment(proto::NumRequest { val }).await?;
        Ok(response.into_inner().val)
    }
}

/// Poll health endpoints until every service answers 200 OK.
pub async fn wait_for_services(endpoints: &ServiceEndpoints, timeout: Duration) -> Result<()> {
    let health_urls = endpoints.health_urls();
    let client = reqwest::Client::new();
    let start = std::time::Instant::now();

    tracing::info!("Waiting for {} services to be healthy...", health_urls.len());

    loop {
        let mut unhealthy_services = Vec::new();

        for (name, url) in &health_urls {
            match client.get(url).timeout(Duration::from_secs(2)).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    unhealthy_services.push(format!("{} (status: {})", name, resp.status()));
                }
                Err(e) => {
                    unhealthy_services.push(format!("{} (error: {})", name, e));
                }
            }
        }

        if unhealthy_services.is_empty() {
            tracing::info!("All services are healthy");
            return Ok(());
        }

        if start.elapsed() > timeout {
            return Err(anyhow!(
                "Timeout waiting for services. Unhealthy: {}",
                unhealthy_services.join(", ")
            ));
        }

        tracing::debug!("Waiting for services: {}", unhealthy_services.join(", "));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
