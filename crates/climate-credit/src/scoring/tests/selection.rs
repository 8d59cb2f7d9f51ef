use super::common::*;
use crate::scoring::features::LoanPurpose;
use crate::scoring::rules::RuleBasedModel;
use crate::scoring::{
    load_model, predict_batch, FeatureRecord, ModelKind, ModelSlot, PredictionRecord, RiskModel,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("climate-credit-{}-{name}", std::process::id()))
}

#[test]
fn batch_preserves_order_and_matches_single_predictions() {
    let model = RuleBasedModel::new();
    let records = vec![
        housing_features(),
        rice_features(),
        features(LoanPurpose::Livestock, 0.1, 0.9, 0.4),
    ];

    let predictions = predict_batch(&model, &records);

    assert_eq!(predictions.len(), records.len());
    for (record, prediction) in records.iter().zip(&predictions) {
        assert_eq!(&model.predict(record), prediction);
    }
    assert_eq!(predictions[0].climate_risk_score, 53);
    assert_eq!(predictions[1].climate_risk_score, 74);
}

#[test]
fn batch_of_nothing_is_empty() {
    let model: Arc<dyn RiskModel> = Arc::new(RuleBasedModel::new());
    assert!(predict_batch(model.as_ref(), &[]).is_empty());
}

#[test]
fn missing_artifact_falls_back_to_rules() {
    let model = load_model(&scratch_path("absent.json"));
    assert_eq!(model.kind(), ModelKind::RuleBased);
    assert_eq!(model.model_version(), "demo-1.0");
}

#[test]
fn malformed_artifact_falls_back_to_rules() {
    let path = scratch_path("malformed.json");
    std::fs::write(&path, "{ not json").expect("write artifact");

    let model = load_model(&path);

    assert_eq!(model.kind(), ModelKind::RuleBased);
    std::fs::remove_file(&path).ok();
}

#[test]
fn valid_artifact_selects_trained_model() {
    let path = scratch_path("valid.json");
    let json = serde_json::to_vec(&artifact()).expect("serialize artifact");
    std::fs::write(&path, json).expect("write artifact");

    let model = load_model(&path);

    assert_eq!(model.kind(), ModelKind::Trained);
    assert_eq!(model.model_version(), "logit-2024.06");
    std::fs::remove_file(&path).ok();
}

#[test]
fn slot_accepts_a_single_install() {
    let slot = ModelSlot::new();
    assert!(!slot.is_loaded());

    slot.install(Arc::new(RuleBasedModel::new()))
        .expect("first install succeeds");
    assert!(slot.is_loaded());
    assert!(slot.install(Arc::new(RuleBasedModel::new())).is_err());
    assert_eq!(
        slot.get().map(|model| model.model_version()),
        Some("demo-1.0")
    );
}

#[test]
fn prefilled_slot_refuses_a_second_engine() {
    let slot = ModelSlot::with_model(Arc::new(RuleBasedModel::new()));

    assert!(slot.is_loaded());
    let rejected = slot
        .install(Arc::new(CountingModel::default()))
        .expect_err("slot already holds an engine");
    assert_eq!(rejected.model_version(), "counting");
    assert_eq!(slot.get().map(|model| model.kind()), Some(ModelKind::RuleBased));
}

#[test]
fn slot_is_shared_across_threads() {
    let slot = Arc::new(ModelSlot::with_model(Arc::new(RuleBasedModel::new())));
    let expected = RuleBasedModel::new().predict(&housing_features());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                slot.get()
                    .expect("model installed")
                    .predict(&housing_features())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread completes"), expected);
    }
}

#[derive(Debug, Default)]
struct CountingModel {
    releases: AtomicUsize,
}

impl RiskModel for CountingModel {
    fn predict(&self, features: &FeatureRecord) -> PredictionRecord {
        RuleBasedModel::new().predict(features)
    }

    fn model_version(&self) -> &str {
        "counting"
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Trained
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn release_guard_runs_on_drop() {
    let model = Arc::new(CountingModel::default());
    let slot = Arc::new(ModelSlot::with_model(model.clone()));
    {
        let _guard = slot.release_on_drop();
        assert_eq!(model.releases.load(Ordering::SeqCst), 0);
    }
    assert_eq!(model.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn releasing_an_empty_slot_is_a_no_op() {
    ModelSlot::new().release();
}
