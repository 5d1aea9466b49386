use gateway::config::GatewayConfig;
use gateway::startup::Application;
use service_core::observability::init_tracing;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let configuration = GatewayConfig::from_env().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        &configuration.service_name,
        &configuration.log_level,
        configuration.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        port = configuration.common.port,
        backend = %configuration.backend.endpoint(),
        connect_timeout_ms = configuration.backend.connect_timeout.as_millis() as u64,
        request_timeout_ms = configuration.backend.request_timeout.as_millis() as u64,
        max_retries = configuration.backend.max_retries,
        "Starting gateway"
    );

    let app = Application::build(configuration)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start gateway: {}", e))?;

    app.run_with_shutdown(shutdown_signal()).await?;

    tracing::info!("Gateway shutdown complete");
    Ok(())
}
