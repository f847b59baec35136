use axum::{extract::State, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::SharedState;

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if state.executives.is_empty() {
        return Err(ApiError::ServiceUnavailable("executive table is empty".into()));
    }

    Ok(Json(json!({
        "status": "ok",
        "model_version": state.artifact.model_version,
        "algorithm": state.artifact.algorithm,
        "executives": state.executives.len(),
        "application": env!("CARGO_PKG_NAME"),
    })))
}
