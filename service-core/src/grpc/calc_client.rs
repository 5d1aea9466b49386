//! Calc service gRPC client.
//!
//! Wraps the generated `Calc` stub with a per-call deadline, trace/request-id
//! propagation and optional retries. The underlying `Channel` is shared by
//! clones, so one client serves every concurrent request of the gateway.

use std::time::Duration;
use tonic::Request;
use tonic::transport::{Channel, Endpoint};

use super::health::{HealthStatus, check_health};
use super::interceptors::inject_trace_context_with_request_id;
use super::proto::calc::NumRequest;
use super::proto::calc::calc_client::CalcClient as CalcServiceClient;
use super::retry::{RetryConfig, retry_grpc_call};

/// Fully-qualified gRPC service name, also used as the health check key.
pub const SERVICE_NAME: &str = "calc.v1.Calc";

/// Configuration for the calc service client.
#[derive(Clone, Debug)]
pub struct CalcClientConfig {
    /// The gRPC endpoint of calc-service, e.g. `http://127.0.0.1:8000`.
    pub endpoint: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Deadline for a single call, propagated as `grpc-timeout`.
    pub request_timeout: Duration,
    /// Retry configuration.
    pub retry_config: RetryConfig,
}

impl Default for CalcClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            retry_config: RetryConfig::no_retry(),
        }
    }
}

/// Calc service client.
#[derive(Clone)]
pub struct CalcClient {
    channel: Channel,
    client: CalcServiceClient<Channel>,
    endpoint: String,
    request_timeout: Duration,
    retry_config: RetryConfig,
}

impl CalcClient {
    /// Create a client whose connection is established on first use.
    ///
    /// Construction only fails on a malformed endpoint; an unreachable
    /// backend surfaces later as `UNAVAILABLE` on the call itself.
    pub fn new_lazy(config: CalcClientConfig) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(config.endpoint.clone())?
            .connect_timeout(config.connect_timeout)
            .connect_lazy();
        Ok(Self::from_channel(channel, config))
    }

    /// Create a client and connect eagerly, failing if the backend is unreachable.
    pub async fn connect(config: CalcClientConfig) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(config.endpoint.clone())?
            .connect_timeout(config.connect_timeout)
            .connect()
            .await?;
        Ok(Self::from_channel(channel, config))
    }

    fn from_channel(channel: Channel, config: CalcClientConfig) -> Self {
        Self {
            client: CalcServiceClient::new(channel.clone()),
            channel,
            endpoint: config.endpoint,
            request_timeout: config.request_timeout,
            retry_config: config.retry_config,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call `Increment(val)` and return the incremented value.
    ///
    /// Every attempt is bounded by the configured deadline. Dropping the
    /// returned future cancels the in-flight call.
    pub async fn increment(
        &self,
        val: i64,
        request_id: Option<&str>,
    ) -> Result<i64, tonic::Status> {
        let client = self.client.clone();
        let deadline = self.request_timeout;

        retry_grpc_call(&self.retry_config, "increment", || {
            let mut c = client.clone();
            let mut request = Request::new(NumRequest { val });
            request.set_timeout(deadline);
            inject_trace_context_with_request_id(&mut request, request_id);
            async move {
                match tokio::time::timeout(deadline, c.increment(request)).await {
                    Ok(response) => response
                        .map(|r| r.into_inner().val)
                        .map_err(unreachable_as_unavailable),
                    Err(_) => Err(tonic::Status::deadline_exceeded(format!(
                        "calc-service did not answer within {}ms",
                        deadline.as_millis()
                    ))),
                }
            }
        })
        .await
    }

    /// Ask calc-service's gRPC health service whether `Calc` is serving.
    pub async fn health(&self) -> Result<HealthStatus, tonic::Status> {
        match tokio::time::timeout(
            self.request_timeout,
            check_health(self.channel.clone(), SERVICE_NAME),
        )
        .await
        {
            Ok(status) => status,
            Err(_) => Err(tonic::Status::deadline_exceeded("health check timed out")),
        }
    }
}

/// A connect failure on the channel can come back as `UNKNOWN` wrapping a
/// transport error; report it as `UNAVAILABLE`.
fn unreachable_as_unavailable(status: tonic::Status) -> tonic::Status {
    let is_transport = std::error::Error::source(&status)
        .is_some_and(|source| source.is::<tonic::transport::Error>())
        || status.message().contains("transport error");
    if is_transport && status.code() == tonic::Code::Unknown {
        tonic::Status::unavailable(format!("calc-service unreachable: {}", status.message()))
    } else {
        status
    }
}
