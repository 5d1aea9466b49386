//! Common test utilities for gateway integration tests.

use calc_service::config::CalcConfig;
use calc_service::grpc::proto::calc_server::{Calc, CalcServer};
use calc_service::grpc::proto::{NumRequest, NumResponse};
use gateway::config::GatewayConfig;
use gateway::startup::Application;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Gateway in front of a real in-process calc-service.
    pub async fn spawn() -> Self {
        let backend_port = spawn_calc_service().await;
        Self::spawn_with_config(GatewayConfig::for_tests(backend_port)).await
    }

    pub async fn spawn_with_config(config: GatewayConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build gateway");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self {
            address,
            client: reqwest::Client::new(),
        }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Start calc-service on free ports and return its gRPC port.
pub async fn spawn_calc_service() -> u16 {
    let app = calc_service::startup::Application::build(CalcConfig::for_tests())
        .await
        .expect("Failed to build calc-service");
    let grpc_port = app.grpc_port();

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    grpc_port
}

/// A port nothing is listening on.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// What a slow backend saw of its calls.
#[derive(Clone, Default)]
pub struct CallLog {
    pub started: Arc<AtomicBool>,
    pub cancelled: Arc<AtomicBool>,
}

impl CallLog {
    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Sets `cancelled` if the handler future is dropped before it finishes.
struct CancelFlag {
    cancelled: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for CancelFlag {
    fn drop(&mut self) {
        if self.armed {
            self.cancelled.store(true, Ordering::SeqCst);
        }
    }
}

/// Calc implementation that answers correctly but only after `delay`.
struct SlowCalc {
    delay: Duration,
    log: CallLog,
}

#[tonic::async_trait]
impl Calc for SlowCalc {
    async fn increment(
        &self,
        request: Request<NumRequest>,
    ) -> Result<Response<NumResponse>, Status> {
        self.log.started.store(true, Ordering::SeqCst);
        let mut flag = CancelFlag {
            cancelled: self.log.cancelled.clone(),
            armed: true,
        };

        tokio::time::sleep(self.delay).await;

        flag.armed = false;
        Ok(Response::new(NumResponse {
            val: request.into_inner().val + 1,
        }))
    }
}

/// Start a backend that takes `delay` per call and return its port.
pub async fn spawn_slow_backend(delay: Duration) -> u16 {
    spawn_logged_slow_backend(delay).await.0
}

/// Like `spawn_slow_backend`, also returning the backend's call log.
pub async fn spawn_logged_slow_backend(delay: Duration) -> (u16, CallLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let log = CallLog::default();
    let service = SlowCalc {
        delay,
        log: log.clone(),
    };

    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(CalcServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .ok();
    });

    (port, log)
}
