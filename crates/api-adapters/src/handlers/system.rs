//! Liveness, metrics and the fallback route.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use domains::DomainError;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const OPENMETRICS: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

pub async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state.metrics.encode().map_err(DomainError::internal)?;
    Ok(([(CONTENT_TYPE, OPENMETRICS)], body))
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
