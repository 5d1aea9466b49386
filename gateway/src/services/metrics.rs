use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Outcome of every call made to calc-service, labelled by gRPC status.
pub static BACKEND_CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new(
            "gateway_backend_calls_total",
            "Total number of calls to calc-service",
        ),
        &["status"],
    )
    .expect("metric can be created");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("collector can be registered");
    counter
});

pub fn init_metrics() {
    Lazy::force(&BACKEND_CALLS_TOTAL);
}

/// Count one backend call. `status` is `ok` or the gRPC code name.
pub fn record_backend_call(status: &str) {
    BACKEND_CALLS_TOTAL.with_label_values(&[status]).inc();
}

/// Prometheus text for the gateway's own counters followed by the HTTP
/// middleware metrics.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    let mut output = String::from_utf8(buffer).unwrap_or_default();
    output.push_str(&service_core::observability::render_metrics());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_calls_are_exported() {
        init_metrics();
        record_backend_call("Unavailable");
        let output = get_metrics();
        assert!(output.contains("gateway_backend_calls_total"));
        assert!(output.contains(r#"status="Unavailable""#));
    }
}
