use axum::{
    Router,
    middleware::from_fn,
    routing::{any, get},
};
use service_core::error::AppError;
use service_core::grpc::CalcClient;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use service_core::observability::install_metrics_recorder;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::config::GatewayConfig;
use crate::handlers::{
    app::{health_check, index, readiness_check},
    increment::increment,
    metrics::metrics,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(index))
        .route("/increment", get(increment))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Bound listener plus the state the router will serve.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Create the calc-service client and bind the HTTP listener.
    ///
    /// The backend channel connects lazily, so the gateway starts even when
    /// calc-service is not up yet; calls fail with 503 until it is.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        install_metrics_recorder();
        crate::services::metrics::init_metrics();

        let calc_client = CalcClient::new_lazy(config.backend.client_config()).map_err(|e| {
            tracing::error!(error = %e, endpoint = %config.backend.endpoint(), "Invalid backend endpoint");
            AppError::ConfigError(anyhow::anyhow!(
                "invalid backend endpoint {}: {}",
                config.backend.endpoint(),
                e
            ))
        })?;

        let address = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(address).await.map_err(|e| {
            tracing::error!(error = %e, %address, "Failed to bind TCP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, calc_client),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, letting in-flight requests finish.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            service = %self.state.config.service_name,
            port = self.port,
            backend = %self.state.calc_client.endpoint(),
            "Gateway ready to accept connections"
        );

        let app = build_router(self.state);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Server error");
                e
            })
    }
}
