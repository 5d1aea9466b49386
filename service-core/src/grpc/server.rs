//! gRPC server builder utilities.

use std::time::Duration;

use tonic::transport::Server;
use tonic_reflection::server::Builder as ReflectionBuilder;

/// Builder for a tonic `Server` with the settings every service shares.
pub struct GrpcServerBuilder {
    service_name: String,
    enable_reflection: bool,
    http2_keepalive_interval: Option<Duration>,
    http2_keepalive_timeout: Option<Duration>,
    concurrency_limit: Option<usize>,
    request_timeout: Option<Duration>,
}

impl GrpcServerBuilder {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            enable_reflection: true,
            http2_keepalive_interval: Some(Duration::from_secs(30)),
            http2_keepalive_timeout: Some(Duration::from_secs(10)),
            concurrency_limit: None,
            request_timeout: None,
        }
    }

    /// Enable or disable gRPC reflection (enabled by default).
    pub fn with_reflection(mut self, enable: bool) -> Self {
        self.enable_reflection = enable;
        self
    }

    /// Cap concurrent streams per connection; `None` leaves tonic's default.
    pub fn with_concurrency_limit(mut self, limit: Option<usize>) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Upper bound on handling time; a shorter `grpc-timeout` from the caller wins.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn reflection_enabled(&self) -> bool {
        self.enable_reflection
    }

    /// Build a tonic Server with the configured settings.
    pub fn build_server(&self) -> Server {
        tracing::debug!(
            service = %self.service_name,
            reflection = self.enable_reflection,
            concurrency_limit = ?self.concurrency_limit,
            request_timeout_ms = ?self.request_timeout.map(|t| t.as_millis() as u64),
            "Building gRPC server"
        );

        let mut server = Server::builder();

        if let Some(interval) = self.http2_keepalive_interval {
            server = server.http2_keepalive_interval(Some(interval));
        }

        if let Some(timeout) = self.http2_keepalive_timeout {
            server = server.http2_keepalive_timeout(Some(timeout));
        }

        if let Some(limit) = self.concurrency_limit {
            server = server.concurrency_limit_per_connection(limit);
        }

        if let Some(timeout) = self.request_timeout {
            server = server.timeout(timeout);
        }

        server
    }
}

/// Create a reflection service from encoded file descriptor sets.
///
/// ```ignore
/// let reflection = create_reflection_service(&[proto::FILE_DESCRIPTOR_SET])?;
/// ```
pub fn create_reflection_service(
    file_descriptor_sets: &[&[u8]],
) -> Result<
    tonic_reflection::server::ServerReflectionServer<
        impl tonic_reflection::server::ServerReflection,
    >,
    tonic_reflection::server::Error,
> {
    let mut builder = ReflectionBuilder::configure();

    for fds in file_descriptor_sets {
        builder = builder.register_encoded_file_descriptor_set(fds);
    }

    builder.build_v1()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = GrpcServerBuilder::new("calc-service");
        assert_eq!(builder.service_name, "calc-service");
        assert!(builder.reflection_enabled());
        assert!(builder.concurrency_limit.is_none());
        assert!(builder.request_timeout.is_none());
    }

    #[test]
    fn test_builder_configuration() {
        let builder = GrpcServerBuilder::new("calc-service")
            .with_reflection(false)
            .with_concurrency_limit(Some(100))
            .with_request_timeout(Duration::from_secs(5));

        assert!(!builder.reflection_enabled());
        assert_eq!(builder.concurrency_limit, Some(100));
        assert_eq!(builder.request_timeout, Some(Duration::from_secs(5)));
    }
}
