//! Prometheus metrics for calc-service.

use once_cell::sync::Lazy;
use prometheus::{
    CounterVec, Encoder, HistogramVec, Registry, TextEncoder, histogram_opts, opts,
};

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// gRPC request counter by method and status.
pub static GRPC_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    let counter = CounterVec::new(
        opts!("calc_grpc_requests_total", "Total number of gRPC requests"),
        &["method", "status"],
    )
    .expect("Failed to create calc_grpc_requests_total");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register calc_grpc_requests_total");
    counter
});

/// gRPC request duration histogram by method.
pub static GRPC_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        histogram_opts!(
            "calc_grpc_request_duration_seconds",
            "gRPC request duration in seconds",
            vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
        ),
        &["method"],
    )
    .expect("Failed to create calc_grpc_request_duration_seconds");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("Failed to register calc_grpc_request_duration_seconds");
    histogram
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&GRPC_REQUESTS_TOTAL);
    Lazy::force(&GRPC_REQUEST_DURATION);
}

/// Record the outcome of one gRPC call.
pub fn record_request(method: &str, status: &str) {
    GRPC_REQUESTS_TOTAL
        .with_label_values(&[method, status])
        .inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer).ok();
    let mut output = String::from_utf8(buffer).unwrap_or_default();
    output.push_str(&service_core::observability::render_metrics());
    output
}
