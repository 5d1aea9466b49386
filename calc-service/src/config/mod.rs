//! Configuration module for calc-service.

use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default port of the HTTP probe listener. Kept off 8080, which belongs to
/// the gateway when both run on one host.
pub const DEFAULT_PROBE_PORT: u16 = 8001;

#[derive(Debug, Clone)]
pub struct CalcConfig {
    /// `grpc_port` serves `calc.v1.Calc`.
    pub common: core_config::Config,
    /// HTTP listener for `/health`, `/ready` and `/metrics` (`CALC_PROBE_PORT`).
    pub probe_port: u16,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    /// Server-side cap on a single call.
    pub request_timeout: Duration,
    /// Serve gRPC reflection (`CALC_GRPC_REFLECTION`, default on).
    pub grpc_reflection: bool,
    /// Concurrent streams per connection (`CALC_GRPC_CONCURRENCY_LIMIT`).
    pub grpc_concurrency_limit: Option<usize>,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            probe_port: DEFAULT_PROBE_PORT,
            service_name: "calc-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            request_timeout: Duration::from_secs(10),
            grpc_reflection: true,
            grpc_concurrency_limit: None,
        }
    }
}

impl CalcConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let defaults = Self::default();

        Ok(Self {
            common,
            probe_port: env::var("CALC_PROBE_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.probe_port),
            service_name: env::var("SERVICE_NAME").unwrap_or(defaults.service_name),
            service_version: env::var("SERVICE_VERSION").unwrap_or(defaults.service_version),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            request_timeout: core_config::env_millis("CALC_REQUEST_TIMEOUT_MS", 10_000),
            grpc_reflection: env::var("CALC_GRPC_REFLECTION")
                .map(|s| !matches!(s.as_str(), "0" | "false" | "off"))
                .unwrap_or(defaults.grpc_reflection),
            grpc_concurrency_limit: env::var("CALC_GRPC_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|limit| *limit > 0),
        })
    }

    /// Configuration for tests: both listeners on OS-assigned ports.
    pub fn for_tests() -> Self {
        Self {
            common: core_config::Config {
                port: 0,
                grpc_port: 0,
            },
            probe_port: 0,
            service_name: "calc-service-test".to_string(),
            log_level: "debug".to_string(),
            ..Self::default()
        }
    }
}
