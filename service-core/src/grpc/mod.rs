//! gRPC utilities shared by calc-service and the gateway.
//!
//! - Error conversion between `AppError` and `tonic::Status`
//! - Interceptors for trace context propagation
//! - Health service (server reporter and client check)
//! - Server builder and reflection
//! - Retry utilities for service-to-service calls
//! - Calc service client

pub mod calc_client;
pub mod error;
pub mod health;
pub mod interceptors;
pub mod retry;
pub mod server;

// Include the generated proto code for clients
pub mod proto {
    pub mod calc {
        tonic::include_proto!("calc.v1");
    }
}

pub use calc_client::{CalcClient, CalcClientConfig, SERVICE_NAME as CALC_SERVICE_NAME};
pub use error::{GrpcResult, IntoStatus};
pub use health::{
    HealthComponents, HealthReporter, HealthStatus, check_health, create_health_service,
};
pub use interceptors::{
    extract_request_id, extract_traceparent, inject_trace_context,
    inject_trace_context_with_request_id, trace_context_interceptor,
};
pub use retry::{RetryConfig, is_retryable, retry_grpc_call};
pub use server::{GrpcServerBuilder, create_reflection_service};
