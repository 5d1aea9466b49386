//! gRPC interceptors for trace context and request correlation.
//!
//! The gateway injects `traceparent`/`tracestate` and `x-request-id` into the
//! metadata of outgoing calls; calc-service reads them back in
//! [`trace_context_interceptor`].

use opentelemetry::trace::TraceContextExt;
use tonic::{Request, Status};
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// gRPC metadata key for W3C traceparent header.
pub const TRACEPARENT_KEY: &str = "traceparent";

/// gRPC metadata key for W3C tracestate header.
pub const TRACESTATE_KEY: &str = "tracestate";

/// gRPC metadata key for request ID.
pub const REQUEST_ID_KEY: &str = "x-request-id";

/// Interceptor that logs incoming trace context and records the request ID
/// on the current span.
///
/// ```ignore
/// let svc = CalcServer::with_interceptor(calc, trace_context_interceptor);
/// ```
#[allow(clippy::result_large_err)]
pub fn trace_context_interceptor(request: Request<()>) -> Result<Request<()>, Status> {
    if let Some(traceparent) = extract_traceparent(&request) {
        tracing::debug!(traceparent = %traceparent, "Received trace context");
    }

    if let Some(request_id) = extract_request_id(&request) {
        tracing::debug!(request_id = %request_id, "Received request id");
        Span::current().record("request_id", request_id.as_str());
    }

    Ok(request)
}

/// Inject the current span's trace context into outgoing request metadata.
///
/// Does nothing when there is no valid OpenTelemetry span (for example when
/// no OTLP exporter is configured).
pub fn inject_trace_context<T>(request: &mut Request<T>) {
    let span = Span::current();
    let context = span.context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();

    if span_context.is_valid() {
        // Format: version-trace_id-span_id-trace_flags
        let traceparent = format!(
            "00-{}-{}-{:02x}",
            span_context.trace_id(),
            span_context.span_id(),
            span_context.trace_flags().to_u8()
        );

        if let Ok(value) = traceparent.parse() {
            request.metadata_mut().insert(TRACEPARENT_KEY, value);
        }

        let tracestate_str = span_context.trace_state().header();
        if !tracestate_str.is_empty()
            && let Ok(value) = tracestate_str.parse()
        {
            request.metadata_mut().insert(TRACESTATE_KEY, value);
        }
    }
}

/// Inject trace context and, when present, the request ID.
pub fn inject_trace_context_with_request_id<T>(request: &mut Request<T>, request_id: Option<&str>) {
    inject_trace_context(request);

    if let Some(id) = request_id
        && let Ok(value) = id.parse()
    {
        request.metadata_mut().insert(REQUEST_ID_KEY, value);
    }
}

pub fn extract_traceparent<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(TRACEPARENT_KEY)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

pub fn extract_request_id<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(REQUEST_ID_KEY)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
