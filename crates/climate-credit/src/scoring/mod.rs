//! Climate risk engines and their data contracts.
//!
//! Exactly one [`RiskModel`] is chosen at startup by [`load_model`] and installed into a
//! [`ModelSlot`]. Engines are immutable after construction, so a shared reference can be
//! scored from any number of tasks without locking.

pub mod features;
pub mod prediction;
pub mod rules;
pub mod tables;
pub mod trained;

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{error, info};

pub use features::{CropType, FeatureRecord, Hazards, LoanPurpose};
pub use prediction::{DefaultProbability, PredictionRecord, Recommendation, RiskFactor, RiskFactors};
pub use rules::RuleBasedModel;
pub use trained::{ArtifactError, ModelArtifact, TrainedModel};

/// Which implementation produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Trained,
    RuleBased,
}

/// Capability shared by every risk engine.
///
/// `predict` must be total and deterministic for any record that passed validation.
pub trait RiskModel: Send + Sync + fmt::Debug {
    fn predict(&self, features: &FeatureRecord) -> PredictionRecord;

    fn model_version(&self) -> &str;

    fn kind(&self) -> ModelKind;

    /// Shutdown hook for engines holding external resources.
    fn release(&self) {}
}

/// Scores each record independently, preserving input order.
pub fn predict_batch<M>(model: &M, records: &[FeatureRecord]) -> Vec<PredictionRecord>
where
    M: RiskModel + ?Sized,
{
    records.iter().map(|record| model.predict(record)).collect()
}

/// Picks the trained model when its artifact loads, otherwise the rule-based fallback.
///
/// Never fails: a missing or unreadable artifact only changes which engine is returned.
pub fn load_model(artifact_path: &Path) -> Arc<dyn RiskModel> {
    if !artifact_path.is_file() {
        info!(
            path = %artifact_path.display(),
            "no trained model artifact found; using rule-based model"
        );
        return Arc::new(RuleBasedModel::new());
    }

    match TrainedModel::from_path(artifact_path) {
        Ok(model) => {
            info!(
                path = %artifact_path.display(),
                model_version = model.model_version(),
                "loaded trained risk model"
            );
            Arc::new(model)
        }
        Err(err) => {
            error!(
                path = %artifact_path.display(),
                error = %err,
                "trained model artifact rejected; falling back to rule-based model"
            );
            Arc::new(RuleBasedModel::new())
        }
    }
}

/// Write-once holder for the process-wide engine.
#[derive(Debug, Default)]
pub struct ModelSlot {
    model: OnceLock<Arc<dyn RiskModel>>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: Arc<dyn RiskModel>) -> Self {
        Self {
            model: OnceLock::from(model),
        }
    }

    /// Installs the engine. A second install is refused and hands the model back.
    pub fn install(&self, model: Arc<dyn RiskModel>) -> Result<(), Arc<dyn RiskModel>> {
        self.model.set(model)
    }

    pub fn get(&self) -> Option<&Arc<dyn RiskModel>> {
        self.model.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn release(&self) {
        if let Some(model) = self.model.get() {
            info!(model_version = model.model_version(), "releasing risk model");
            model.release();
        }
    }

    /// Guard that runs [`ModelSlot::release`] when dropped.
    pub fn release_on_drop(self: &Arc<Self>) -> ModelReleaseGuard {
        ModelReleaseGuard {
            slot: Arc::clone(self),
        }
    }
}

#[must_use = "the model is released as soon as the guard is dropped"]
pub struct ModelReleaseGuard {
    slot: Arc<ModelSlot>,
}

impl Drop for ModelReleaseGuard {
    fn drop(&mut self) {
        self.slot.release();
    }
}
