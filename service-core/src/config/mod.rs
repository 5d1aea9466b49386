use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

/// Listener ports shared by every service.
///
/// Read from an optional `configuration` file and `APP__*` environment
/// variables (`APP__PORT`, `APP__GRPC_PORT`).
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// HTTP listener port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// gRPC listener port.
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,
}

fn default_port() -> u16 {
    8080
}

fn default_grpc_port() -> u16 {
    8000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            grpc_port: default_grpc_port(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Read a millisecond duration from the environment, falling back to `default_ms`
/// when the variable is unset or not a number.
pub fn env_millis(key: &str, default_ms: u64) -> std::time::Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default_ms);
    std::time::Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.grpc_port, 8000);
    }

    #[test]
    fn test_env_millis_falls_back_on_garbage() {
        // SAFETY: the key is unique to this test.
        unsafe { std::env::set_var("SERVICE_CORE_TEST_MILLIS", "not-a-number") };
        assert_eq!(
            env_millis("SERVICE_CORE_TEST_MILLIS", 250),
            std::time::Duration::from_millis(250)
        );
        assert_eq!(
            env_millis("SERVICE_CORE_TEST_MILLIS_UNSET", 10),
            std::time::Duration::from_millis(10)
        );
    }
}
