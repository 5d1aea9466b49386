//! Gateway configuration, resolved once at startup.

use service_core::config as core_config;
use service_core::error::AppError;
use service_core::grpc::{CalcClientConfig, RetryConfig};
use std::env;
use std::time::Duration;

/// Port calc-service serves gRPC on.
pub const CALC_GRPC_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// `port` is the HTTP listen port (8080 unless `APP__PORT` is set).
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub backend: BackendConfig,
}

/// Where and how to reach calc-service.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: CALC_GRPC_PORT,
            connect_timeout: Duration::from_millis(2_000),
            request_timeout: Duration::from_millis(5_000),
            max_retries: 0,
        }
    }
}

impl BackendConfig {
    /// Read `BACKEND_SERVICE_NAME` and the `BACKEND_*` tunables.
    pub fn from_env() -> Self {
        let max_retries = env::var("BACKEND_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        Self {
            host: env::var("BACKEND_SERVICE_NAME")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: CALC_GRPC_PORT,
            connect_timeout: core_config::env_millis("BACKEND_CONNECT_TIMEOUT_MS", 2_000),
            request_timeout: core_config::env_millis("BACKEND_REQUEST_TIMEOUT_MS", 5_000),
            max_retries,
        }
    }

    /// gRPC endpoint URI, e.g. `http://calc-service:8000`.
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn client_config(&self) -> CalcClientConfig {
        CalcClientConfig {
            endpoint: self.endpoint(),
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            retry_config: RetryConfig::with_max_retries(self.max_retries),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            service_name: "gateway".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            backend: BackendConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "gateway".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            backend: BackendConfig::from_env(),
        })
    }

    /// Configuration for tests: listen on an OS-assigned port and talk to a
    /// calc-service on `backend_port` at loopback.
    pub fn for_tests(backend_port: u16) -> Self {
        Self {
            common: core_config::Config {
                port: 0,
                grpc_port: 0,
            },
            service_name: "gateway-test".to_string(),
            log_level: "debug".to_string(),
            otlp_endpoint: None,
            backend: BackendConfig {
                host: "127.0.0.1".to_string(),
                port: backend_port,
                connect_timeout: Duration::from_millis(500),
                request_timeout: Duration::from_secs(2),
                max_retries: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_uses_fixed_grpc_port() {
        let backend = BackendConfig {
            host: "calc-service".to_string(),
            port: CALC_GRPC_PORT,
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            max_retries: 0,
        };
        assert_eq!(backend.endpoint(), "http://calc-service:8000");
    }

    #[test]
    fn test_client_config_carries_timeouts_and_retries() {
        let mut config = GatewayConfig::for_tests(9000);
        config.backend.max_retries = 2;

        let client = config.backend.client_config();
        assert_eq!(client.endpoint, "http://127.0.0.1:9000");
        assert_eq!(client.request_timeout, Duration::from_secs(2));
        assert_eq!(client.retry_config.max_retries, 2);
    }

    #[test]
    fn test_backend_host_from_env() {
        // Only this test touches BACKEND_* variables.
        // SAFETY: no other thread in this test binary reads or writes them.
        unsafe {
            env::set_var("BACKEND_SERVICE_NAME", "calc.internal");
            env::set_var("BACKEND_REQUEST_TIMEOUT_MS", "750");
        }
        let backend = BackendConfig::from_env();
        assert_eq!(backend.host, "calc.internal");
        assert_eq!(backend.port, CALC_GRPC_PORT);
        assert_eq!(backend.request_timeout, Duration::from_millis(750));
        assert_eq!(backend.max_retries, 0);

        // Empty falls back to loopback
        unsafe { env::set_var("BACKEND_SERVICE_NAME", "") };
        let backend = BackendConfig::from_env();
        assert_eq!(backend.host, "127.0.0.1");
        assert_eq!(backend.endpoint(), "http://127.0.0.1:8000");

        // So does unset
        unsafe {
            env::remove_var("BACKEND_SERVICE_NAME");
            env::remove_var("BACKEND_REQUEST_TIMEOUT_MS");
        }
        let backend = BackendConfig::from_env();
        assert_eq!(backend.host, "127.0.0.1");
        assert_eq!(backend.port, CALC_GRPC_PORT);
        assert_eq!(backend.request_timeout, Duration::from_millis(5_000));
    }
}
