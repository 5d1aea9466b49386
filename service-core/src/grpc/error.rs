//! Error conversion utilities between `AppError` and `tonic::Status`.
//!
//! | gRPC Status | AppError | HTTP |
//! |-------------|----------|------|
//! | `INVALID_ARGUMENT`, `OUT_OF_RANGE`, `FAILED_PRECONDITION` | `BadRequest` | 400 |
//! | `UNAVAILABLE` | `ServiceUnavailable` | 503 |
//! | `DEADLINE_EXCEEDED`, `CANCELLED` | `GatewayTimeout` | 504 |
//! | anything else | `BadGateway` | 502 |

use tonic::{Code, Status};

use crate::error::AppError;

/// Extension trait for converting types into `tonic::Status`.
pub trait IntoStatus {
    /// Convert into a `tonic::Status`.
    fn into_status(self) -> Status;
}

impl IntoStatus for AppError {
    fn into_status(self) -> Status {
        match self {
            AppError::BadRequest(err) => Status::invalid_argument(err.to_string()),
            AppError::InternalError(err) => {
                // Log the full error but don't expose it to clients
                tracing::error!(error = %err, "Internal error");
                Status::internal("Internal server error")
            }
            AppError::BadGateway(msg) => Status::unavailable(format!("Bad gateway: {}", msg)),
            AppError::ServiceUnavailable => Status::unavailable("Service unavailable"),
            AppError::GatewayTimeout(msg) => Status::deadline_exceeded(msg),
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                Status::internal("Configuration error")
            }
        }
    }
}

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        err.into_status()
    }
}

/// Convert a `tonic::Status` received from an upstream service into an `AppError`.
impl From<Status> for AppError {
    fn from(status: Status) -> Self {
        match status.code() {
            Code::InvalidArgument | Code::OutOfRange | Code::FailedPrecondition => {
                AppError::BadRequest(anyhow::anyhow!("{}", status.message()))
            }
            Code::Unavailable => AppError::ServiceUnavailable,
            // A cancelled upstream call from the gateway's point of view is a timer firing.
            Code::DeadlineExceeded | Code::Cancelled => {
                AppError::GatewayTimeout(status.message().to_string())
            }
            Code::Ok => AppError::InternalError(anyhow::anyhow!("Unexpected OK status as error")),
            code => AppError::BadGateway(format!("{:?}: {}", code, status.message())),
        }
    }
}

/// Result type alias for gRPC handlers.
pub type GrpcResult<T> = Result<tonic::Response<T>, Status>;
