//! Reference client: one `Increment` call against a running calc-service.
//!
//! Connection and RPC failures are fatal and exit non-zero.

use clap::Parser;
use service_core::grpc::{CalcClient, CalcClientConfig};
use service_core::observability::init_tracing;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "calc-client")]
#[command(about = "Call calc-service Increment once and log the result", long_about = None)]
struct Cli {
    /// gRPC endpoint of calc-service
    #[arg(short, long, default_value = "http://localhost:8000")]
    endpoint: String,

    /// Value to increment
    #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
    val: i64,

    /// Per-call deadline in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing("calc-client", "info", None);

    let config = CalcClientConfig {
        endpoint: cli.endpoint.clone(),
        request_timeout: Duration::from_millis(cli.timeout_ms),
        ..Default::default()
    };

    let client = match CalcClient::connect(config).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(endpoint = %cli.endpoint, error = %e, "failed to connect");
            return ExitCode::FAILURE;
        }
    };

    match client.increment(cli.val, None).await {
        Ok(value) => {
            tracing::info!(value, "got response");
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(status) => {
            tracing::error!(code = ?status.code(), error = %status.message(), "got error from server");
            ExitCode::FAILURE
        }
    }
}
