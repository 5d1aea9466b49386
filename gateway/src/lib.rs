pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use config::GatewayConfig;
use service_core::grpc::CalcClient;
use std::sync::Arc;

/// Shared application state: configuration and the calc-service client
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub calc_client: Arc<CalcClient>,
}

impl AppState {
    pub fn new(config: GatewayConfig, calc_client: CalcClient) -> Self {
        Self {
            config: Arc::new(config),
            calc_client: Arc::new(calc_client),
        }
    }
}
