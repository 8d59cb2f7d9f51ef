use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::request::{batch_features, PredictionRequest};
use crate::error::AppError;
use crate::scoring::{predict_batch, ModelSlot, PredictionRecord};

const SERVICE_NAME: &str = "Climate Credit Risk Service";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<PredictionRecord>,
}

/// Router builder exposing the scoring endpoints over the installed engine.
pub fn assessment_router(models: Arc<ModelSlot>) -> Router {
    Router::new()
        .route("/", get(service_banner))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .route("/batch-predict", post(batch_predict_handler))
        .with_state(models)
}

pub(crate) async fn service_banner() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
        "endpoints": {
            "/predict": "POST - Get climate risk prediction",
            "/batch-predict": "POST - Score several loan applications",
            "/health": "GET - Health check",
        },
    }))
}

pub(crate) async fn health_handler(State(models): State<Arc<ModelSlot>>) -> Json<Value> {
    let model = models.get();
    Json(json!({
        "status": "healthy",
        "model_loaded": model.is_some(),
        "model_version": model.map(|model| model.model_version()),
        "model_kind": model.map(|model| model.kind()),
    }))
}

pub(crate) async fn predict_handler(
    State(models): State<Arc<ModelSlot>>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionRecord>, AppError> {
    let features = request.into_features()?;
    let model = models.get().ok_or(AppError::ModelUnavailable)?;

    let prediction = model.predict(&features);
    debug!(
        score = prediction.climate_risk_score,
        recommendation = prediction.recommendation.label(),
        "scored loan application"
    );
    Ok(Json(prediction))
}

pub(crate) async fn batch_predict_handler(
    State(models): State<Arc<ModelSlot>>,
    Json(requests): Json<Vec<PredictionRequest>>,
) -> Result<Json<BatchPredictionResponse>, AppError> {
    let records = batch_features(requests)?;
    let model = models.get().ok_or(AppError::ModelUnavailable)?;

    let predictions = predict_batch(model.as_ref(), &records);
    debug!(count = predictions.len(), "scored loan application batch");
    Ok(Json(BatchPredictionResponse { predictions }))
}
