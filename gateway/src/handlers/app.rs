use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use service_core::grpc::HealthStatus;

use crate::AppState;

/// `/` accepts any method and answers 200 with an empty body.
pub async fn index() -> StatusCode {
    tracing::info!("health check");
    StatusCode::OK
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Ready once calc-service's gRPC health service reports `calc.v1.Calc` as serving.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.calc_client.health().await {
        Ok(HealthStatus::Serving) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "backend": state.calc_client.endpoint() })),
        ),
        Ok(status) => {
            tracing::warn!(backend = %state.calc_client.endpoint(), status = ?status, "Backend not serving");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "not_ready", "backend_status": format!("{:?}", status) })),
            )
        }
        Err(e) => {
            tracing::warn!(backend = %state.calc_client.endpoint(), error = %e, "Backend health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "not_ready", "error": e.message() })),
            )
        }
    }
}
