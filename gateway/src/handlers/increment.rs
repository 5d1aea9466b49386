use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_from_headers;

use crate::AppState;
use crate::models::{IncrementQuery, IncrementResponse};
use crate::services::metrics::record_backend_call;

/// Parse the textual `val` query parameter as a base-10 signed 64-bit integer.
pub fn parse_val(raw: Option<&str>) -> Result<i64, AppError> {
    let raw = raw.ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("missing query parameter 'val'"))
    })?;
    raw.parse::<i64>().map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!(
            "invalid 'val' {:?}: {} (expected a signed 64-bit integer)",
            raw,
            e
        ))
    })
}

/// `GET /increment?val=<i64>` forwards to `calc.v1.Calc/Increment` and
/// answers `{"Val": val + 1}`.
pub async fn increment(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<IncrementQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let val = query
        .map_err(|rejection| {
            AppError::BadRequest(anyhow::anyhow!(
                "invalid query string: {}",
                rejection.body_text()
            ))
        })
        .and_then(|Query(query)| parse_val(query.val.as_deref()))
        .inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected increment request");
        })?;

    let request_id = request_id_from_headers(&headers);

    let result = match state.calc_client.increment(val, request_id.as_deref()).await {
        Ok(result) => {
            record_backend_call("ok");
            result
        }
        Err(status) => {
            record_backend_call(&format!("{:?}", status.code()));
            let err = AppError::from(status.clone());
            tracing::error!(
                backend = %state.calc_client.endpoint(),
                value = val,
                code = ?status.code(),
                error = %status.message(),
                http_status = err.status_code().as_u16(),
                "Increment call failed"
            );
            return Err(err);
        }
    };

    let body = serde_json::to_vec(&IncrementResponse { val: result }).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize increment response");
        AppError::from(e)
    })?;

    tracing::info!(value = val, result = result, "Increment succeeded");

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}
