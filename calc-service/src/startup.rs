//! Application startup and lifecycle management.

use crate::config::CalcConfig;
use crate::grpc::{
    CalcServiceImpl,
    proto::{FILE_DESCRIPTOR_SET, calc_server::CalcServer},
};
use crate::services::{get_metrics, init_metrics};
use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};
use serde_json::json;
use service_core::error::AppError;
use service_core::grpc::{
    CALC_SERVICE_NAME, GrpcServerBuilder, create_health_service, create_reflection_service,
    trace_context_interceptor,
};
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use service_core::observability::install_metrics_recorder;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// State for the HTTP probe endpoints.
#[derive(Clone)]
struct HealthState {
    service_name: String,
    shutting_down: watch::Receiver<bool>,
}

/// Liveness probe.
async fn health_check(State(state): State<HealthState>) -> impl IntoResponse {
    tracing::debug!("Health check passed");
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": state.service_name,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness probe. Fails once graceful shutdown has begun.
async fn readiness_check(State(state): State<HealthState>) -> impl IntoResponse {
    if *state.shutting_down.borrow() {
        tracing::debug!("Readiness check failed - shutting down");
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

/// Resolve once the shutdown flag flips (or its sender is gone).
async fn shutdown_requested(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    grpc_port: u16,
    http_listener: TcpListener,
    grpc_listener: TcpListener,
    config: CalcConfig,
}

impl Application {
    /// Bind both listeners. Port 0 picks a free port.
    pub async fn build(config: CalcConfig) -> Result<Self, AppError> {
        init_metrics();
        install_metrics_recorder();

        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.probe_port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %http_addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        let grpc_addr = SocketAddr::from(([0, 0, 0, 0], config.common.grpc_port));
        let grpc_listener = TcpListener::bind(grpc_addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %grpc_addr, "Failed to bind gRPC listener");
            AppError::from(e)
        })?;
        let grpc_port = grpc_listener.local_addr()?.port();

        tracing::info!(
            http_port = http_port,
            grpc_port = grpc_port,
            "Calc service listeners bound"
        );

        Ok(Self {
            http_port,
            grpc_port,
            http_listener,
            grpc_listener,
            config,
        })
    }

    /// Get the HTTP port the probe server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Get the gRPC port the server is listening on.
    pub fn grpc_port(&self) -> u16 {
        self.grpc_port
    }

    /// Run until either server fails.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Run until `shutdown` resolves, then mark the gRPC health status
    /// `NOT_SERVING`, fail readiness, and drain both servers.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let health_state = HealthState {
            service_name: self.config.service_name.clone(),
            shutting_down: shutdown_rx.clone(),
        };

        let http_router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_handler))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(metrics_middleware))
            .layer(middleware::from_fn(request_id_middleware))
            .with_state(health_state);

        // gRPC health service, flipped to NOT_SERVING on shutdown
        let health = create_health_service(CALC_SERVICE_NAME).await;
        let reporter = health.reporter.clone();
        tokio::spawn(async move {
            shutdown.await;
            tracing::info!("Shutdown requested, draining calc-service");
            reporter.set_not_serving().await;
            let _ = shutdown_tx.send(true);
        });

        let server_builder = GrpcServerBuilder::new(self.config.service_name.clone())
            .with_request_timeout(self.config.request_timeout)
            .with_reflection(self.config.grpc_reflection)
            .with_concurrency_limit(self.config.grpc_concurrency_limit);

        // Reflection service for debugging
        let reflection_service = if server_builder.reflection_enabled() {
            Some(create_reflection_service(&[FILE_DESCRIPTOR_SET]).map_err(|e| {
                std::io::Error::other(format!("Failed to build reflection service: {}", e))
            })?)
        } else {
            None
        };

        let grpc_trace_layer = TraceLayer::new_for_grpc()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::DEBUG));

        let calc_service =
            CalcServer::with_interceptor(CalcServiceImpl::new(), trace_context_interceptor);

        let incoming = tokio_stream::wrappers::TcpListenerStream::new(self.grpc_listener);
        let grpc_server = server_builder
            .build_server()
            .layer(grpc_trace_layer)
            .add_service(health.server)
            .add_optional_service(reflection_service)
            .add_service(calc_service)
            .serve_with_incoming_shutdown(incoming, shutdown_requested(shutdown_rx.clone()));

        let http_server = axum::serve(self.http_listener, http_router)
            .with_graceful_shutdown(shutdown_requested(shutdown_rx));

        tracing::info!(
            service = %self.config.service_name,
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.http_port,
            grpc_port = self.grpc_port,
            "Service ready to accept connections"
        );

        tokio::try_join!(
            async {
                grpc_server.await.map_err(|e| {
                    tracing::error!(error = %e, "gRPC server error");
                    std::io::Error::other(format!("gRPC server error: {}", e))
                })
            },
            async {
                http_server.await.map_err(|e| {
                    tracing::error!(error = %e, "HTTP server error");
                    e
                })
            },
        )?;

        Ok(())
    }
}
