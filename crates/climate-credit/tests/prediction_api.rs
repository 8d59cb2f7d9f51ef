//! HTTP behavior of the scoring routes.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use climate_credit::assessment::assessment_router;
use climate_credit::scoring::{ModelSlot, RuleBasedModel};

fn build_router() -> Router {
    let models = Arc::new(ModelSlot::with_model(Arc::new(RuleBasedModel::new())));
    assessment_router(models)
}

fn application(flood: f64, purpose: &str) -> Value {
    json!({
        "location": { "latitude": 23.81, "longitude": 90.41 },
        "climate": { "flood_risk": flood, "drought_risk": 0.2, "heatwave_risk": 0.1 },
        "loan": { "amount": 50000.0, "purpose": purpose },
        "client": { "age": 40, "existing_loans": 1, "repayment_history": 95.0 }
    })
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(payload) => request.body(Body::from(payload.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = router.oneshot(request).await.expect("router dispatch");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, payload)
}

#[tokio::test]
async fn predict_returns_scored_application() {
    let (status, payload) = send(
        build_router(),
        "POST",
        "/predict",
        Some(application(0.8, "housing")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["climate_risk_score"], 53);
    assert_eq!(payload["recommendation"], "caution");
    assert_eq!(payload["default_probability"]["baseline"], 0.126);
    assert_eq!(payload["risk_factors"]["flood"]["weight"], 0.6);
    assert_eq!(payload["confidence"], 0.85);
    assert_eq!(payload["model_version"], "demo-1.0");
}

#[tokio::test]
async fn predict_rejects_out_of_range_hazard() {
    let (status, payload) = send(
        build_router(),
        "POST",
        "/predict",
        Some(application(1.5, "housing")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("climate.flood_risk"));
}

#[tokio::test]
async fn predict_without_model_is_unavailable() {
    let router = assessment_router(Arc::new(ModelSlot::new()));

    let body = Some(application(0.8, "housing"));
    let (status, payload) = send(router, "POST", "/predict", body).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(payload["error"], "risk model not loaded");
}

#[tokio::test]
async fn batch_predict_preserves_order() {
    let batch = json!([
        application(0.8, "housing"),
        application(0.0, "livestock"),
        application(1.0, "fishing"),
    ]);

    let (status, payload) = send(build_router(), "POST", "/batch-predict", Some(batch)).await;

    assert_eq!(status, StatusCode::OK);
    let predictions = payload["predictions"].as_array().expect("predictions array");
    let scores: Vec<i64> = predictions
        .iter()
        .map(|prediction| prediction["climate_risk_score"].as_i64().expect("score"))
        .collect();
    // livestock: 0.2 * 0.5 + 0.1 * 0.2; fishing weighs like small business.
    assert_eq!(scores, vec![53, 12, 57]);
}

#[tokio::test]
async fn batch_predict_names_the_invalid_item() {
    let mut invalid = application(0.5, "housing");
    invalid["client"]["age"] = json!(16);

    let (status, payload) = send(
        build_router(),
        "POST",
        "/batch-predict",
        Some(json!([application(0.5, "housing"), invalid])),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("predictions[1]"));
}

#[tokio::test]
async fn health_reports_loaded_model() {
    let (status, payload) = send(build_router(), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["model_loaded"], true);
    assert_eq!(payload["model_version"], "demo-1.0");
    assert_eq!(payload["model_kind"], "rule_based");
}

#[tokio::test]
async fn health_reports_missing_model() {
    let router = assessment_router(Arc::new(ModelSlot::new()));
    let (_, payload) = send(router, "GET", "/health", None).await;

    assert_eq!(payload["model_loaded"], false);
    assert_eq!(payload["model_version"], Value::Null);
}

#[tokio::test]
async fn banner_lists_endpoints() {
    let (status, payload) = send(build_router(), "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "healthy");
    assert!(payload["endpoints"].get("/predict").is_some());
}
