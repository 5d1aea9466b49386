//! Calc gRPC implementation.

use crate::grpc::proto::{NumRequest, NumResponse, calc_server::Calc};
use crate::services::increment;
use crate::services::metrics::{GRPC_REQUEST_DURATION, record_request};
use service_core::grpc::{GrpcResult, extract_request_id};
use tonic::{Request, Response, Status};
use tracing::{info, instrument, warn};

/// Calc service implementation. Holds no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalcServiceImpl;

impl CalcServiceImpl {
    pub fn new() -> Self {
        Self
    }
}

#[tonic::async_trait]
impl Calc for CalcServiceImpl {
    #[instrument(
        skip(self, request),
        fields(service = "calc-service", method = "Increment", request_id = tracing::field::Empty)
    )]
    async fn increment(&self, request: Request<NumRequest>) -> GrpcResult<NumResponse> {
        let timer = GRPC_REQUEST_DURATION
            .with_label_values(&["Increment"])
            .start_timer();

        if let Some(request_id) = extract_request_id(&request) {
            tracing::Span::current().record("request_id", request_id.as_str());
        }

        let val = request.into_inner().val;
        let result = increment(val);
        timer.observe_duration();

        match result {
            Ok(incremented) => {
                record_request("Increment", "ok");
                info!(value = val, result = incremented, "Incremented value");
                Ok(Response::new(NumResponse { val: incremented }))
            }
            Err(e) => {
                record_request("Increment", "out_of_range");
                warn!(value = val, error = %e, "Increment rejected");
                Err(Status::from(e))
            }
        }
    }
}
