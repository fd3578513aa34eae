//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::features::EcgEncoding;
use crate::model::ModelInfo;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    environment: String,
    resting_ecg_encoding: EcgEncoding,
    model: Option<ModelInfo>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        environment: state.config.environment.clone(),
        resting_ecg_encoding: state.predictor.ecg_encoding(),
        model: state.predictor.model_info().cloned(),
    })
}
