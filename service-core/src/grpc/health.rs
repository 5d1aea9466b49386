//! gRPC health checking, both sides.
//!
//! The server side wraps `tonic-health` so a service can flip its status on
//! shutdown. The client side asks a peer whether a named service is serving,
//! which the gateway uses for its readiness probe.

use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::transport::Channel;
use tonic_health::pb::HealthCheckRequest;
use tonic_health::pb::health_check_response::ServingStatus as ProtoServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::server::HealthReporter as TonicHealthReporter;

/// Health status for a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Service is healthy and ready to accept requests.
    Serving,
    /// Service is not ready to accept requests.
    NotServing,
    /// Health status is unknown.
    Unknown,
}

impl From<HealthStatus> for tonic_health::ServingStatus {
    fn from(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Serving => tonic_health::ServingStatus::Serving,
            HealthStatus::NotServing => tonic_health::ServingStatus::NotServing,
            HealthStatus::Unknown => tonic_health::ServingStatus::Unknown,
        }
    }
}

impl From<i32> for HealthStatus {
    fn from(value: i32) -> Self {
        match ProtoServingStatus::try_from(value) {
            Ok(ProtoServingStatus::Serving) => HealthStatus::Serving,
            Ok(ProtoServingStatus::NotServing) => HealthStatus::NotServing,
            _ => HealthStatus::Unknown,
        }
    }
}

/// Reporter for updating the health status of one named service.
#[derive(Clone)]
pub struct HealthReporter {
    inner: Arc<RwLock<TonicHealthReporter>>,
    service_name: String,
}

impl HealthReporter {
    pub fn new(reporter: TonicHealthReporter, service_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(reporter)),
            service_name: service_name.into(),
        }
    }

    pub async fn set_status(&self, status: HealthStatus) {
        let mut reporter = self.inner.write().await;
        reporter
            .set_service_status(&self.service_name, status.into())
            .await;
        tracing::info!(service = %self.service_name, status = ?status, "gRPC health status updated");
    }

    pub async fn set_not_serving(&self) {
        self.set_status(HealthStatus::NotServing).await;
    }
}

/// Health service components returned by `create_health_service`.
pub struct HealthComponents<S> {
    /// The health server to add to the gRPC router.
    pub server: tonic_health::pb::health_server::HealthServer<S>,
    /// The reporter for updating health status.
    pub reporter: HealthReporter,
}

/// Create a health service whose named service starts out `SERVING`.
///
/// ```ignore
/// let health = create_health_service("calc.v1.Calc").await;
/// Server::builder().add_service(health.server).add_service(calc).serve(addr).await?;
/// health.reporter.set_not_serving().await;
/// ```
pub async fn create_health_service(
    service_name: impl Into<String>,
) -> HealthComponents<impl tonic_health::pb::health_server::Health> {
    let service_name = service_name.into();
    let (mut reporter, health_server) = tonic_health::server::health_reporter();

    reporter
        .set_service_status(&service_name, tonic_health::ServingStatus::Serving)
        .await;

    HealthComponents {
        server: health_server,
        reporter: HealthReporter::new(reporter, service_name),
    }
}

/// Ask the peer behind `channel` for the status of `service_name`.
pub async fn check_health(
    channel: Channel,
    service_name: &str,
) -> Result<HealthStatus, tonic::Status> {
    let mut client = HealthClient::new(channel);
    let response = client
        .check(HealthCheckRequest {
            service: service_name.to_string(),
        })
        .await?;
    Ok(HealthStatus::from(response.into_inner().status))
}
