//! Engine backed by a fitted model artifact.
//!
//! The artifact is a JSON document holding two logistic terms over the feature
//! record: one for climate risk, one for the client-only default rate. Once loaded
//! the model is immutable; probability composition, recommendation bands, and
//! display rounding are shared with the rule-based engine.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::features::{FeatureRecord, Hazards};
use super::prediction::{climate_risk_score, DefaultProbability, PredictionRecord};
use super::{ModelKind, RiskModel};

/// Feature names a coefficient may be keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    FloodRisk,
    DroughtRisk,
    HeatwaveRisk,
    Age,
    ExistingLoans,
    RepaymentHistory,
    Latitude,
    Longitude,
    Amount,
}

impl FeatureName {
    pub fn value_in(self, features: &FeatureRecord) -> f64 {
        match self {
            Self::FloodRisk => features.flood_risk,
            Self::DroughtRisk => features.drought_risk,
            Self::HeatwaveRisk => features.heatwave_risk,
            Self::Age => f64::from(features.age),
            Self::ExistingLoans => f64::from(features.existing_loans),
            Self::RepaymentHistory => features.repayment_history,
            Self::Latitude => features.latitude,
            Self::Longitude => features.longitude,
            Self::Amount => features.amount,
        }
    }
}

/// Intercept plus per-feature coefficients, passed through the logistic function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticTerm {
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<FeatureName, f64>,
}

impl LogisticTerm {
    pub fn probability(&self, features: &FeatureRecord) -> f64 {
        let linear = self
            .coefficients
            .iter()
            .fold(self.intercept, |acc, (name, coefficient)| {
                acc + coefficient * name.value_in(features)
            });
        1.0 / (1.0 + (-linear).exp())
    }

    fn coefficient(&self, name: FeatureName) -> f64 {
        self.coefficients.get(&name).copied().unwrap_or(0.0)
    }

    fn non_finite_field(&self, term: &str) -> Option<String> {
        if !self.intercept.is_finite() {
            return Some(format!("{term}.intercept"));
        }
        self.coefficients
            .iter()
            .find(|(_, coefficient)| !coefficient.is_finite())
            .map(|(name, _)| format!("{term}.coefficients.{name:?}"))
    }
}

/// On-disk representation of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelArtifact {
    pub model_version: String,
    pub confidence: f64,
    pub climate: LogisticTerm,
    pub default: LogisticTerm,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact field {field} must be finite")]
    NonFinite { field: String },
    #[error("model artifact confidence {0} must lie within 0..=1")]
    Confidence(f64),
    #[error("model artifact must name a model_version")]
    MissingVersion,
    #[error("climate term must weight at least one hazard")]
    NoHazardWeights,
}

/// Engine wrapping a validated [`ModelArtifact`].
#[derive(Debug, Clone)]
pub struct TrainedModel {
    artifact: ModelArtifact,
    hazard_weights: Hazards,
}

impl TrainedModel {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ArtifactError> {
        if artifact.model_version.trim().is_empty() {
            return Err(ArtifactError::MissingVersion);
        }
        if !(0.0..=1.0).contains(&artifact.confidence) {
            return Err(ArtifactError::Confidence(artifact.confidence));
        }
        if let Some(field) = artifact
            .climate
            .non_finite_field("climate")
            .or_else(|| artifact.default.non_finite_field("default"))
        {
            return Err(ArtifactError::NonFinite { field });
        }

        let hazard_weights = hazard_shares(&artifact.climate)?;
        Ok(Self {
            artifact,
            hazard_weights,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let artifact: ModelArtifact = serde_json::from_reader(reader)?;
        Self::from_artifact(artifact)
    }

    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Share of each hazard in the climate term, by absolute coefficient.
    pub fn hazard_weights(&self) -> Hazards {
        self.hazard_weights
    }
}

fn hazard_shares(term: &LogisticTerm) -> Result<Hazards, ArtifactError> {
    let raw = Hazards::new(
        term.coefficient(FeatureName::FloodRisk).abs(),
        term.coefficient(FeatureName::DroughtRisk).abs(),
        term.coefficient(FeatureName::HeatwaveRisk).abs(),
    );
    let total = raw.total();
    if total <= 0.0 {
        return Err(ArtifactError::NoHazardWeights);
    }
    Ok(Hazards::new(
        raw.flood / total,
        raw.drought / total,
        raw.heatwave / total,
    ))
}

impl RiskModel for TrainedModel {
    fn predict(&self, features: &FeatureRecord) -> PredictionRecord {
        let risk_score = climate_risk_score(self.artifact.climate.probability(features));
        let baseline = self.artifact.default.probability(features);
        let probability = DefaultProbability::compose(baseline, risk_score);

        PredictionRecord::assemble(
            risk_score,
            probability,
            features.hazards(),
            self.hazard_weights,
            self.artifact.confidence,
            &self.artifact.model_version,
        )
    }

    fn model_version(&self) -> &str {
        &self.artifact.model_version
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Trained
    }

    fn release(&self) {
        info!(model_version = %self.artifact.model_version, "releasing trained risk model");
    }
}
