use super::features::{FeatureRecord, Hazards, LoanPurpose};
use super::prediction::{climate_risk_score, DefaultProbability, PredictionRecord};
use super::tables::{crop_vulnerability, purpose_weights};
use super::{ModelKind, RiskModel};

pub const RULE_BASED_VERSION: &str = "demo-1.0";
pub const RULE_BASED_CONFIDENCE: f64 = 0.85;

const BASE_DEFAULT_RATE: f64 = 0.12;
const AGE_PENALTY: f64 = 1.1;
const HEAVY_BORROWER_PENALTY: f64 = 1.2;
const FIRST_LOAN_DISCOUNT: f64 = 0.9;

/// Weighted hazard exposure after purpose and crop adjustments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateExposure {
    pub hazards: Hazards,
    pub weights: Hazards,
    pub climate_risk: f64,
}

/// In-process fallback engine built from the purpose and crop tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedModel;

impl RuleBasedModel {
    pub fn new() -> Self {
        Self
    }

    pub fn climate_exposure(&self, features: &FeatureRecord) -> ClimateExposure {
        let weights = purpose_weights(features.purpose);
        let mut hazards = features.hazards();

        // Crop vulnerability only attenuates agricultural loans that name a crop.
        if let (LoanPurpose::Agriculture, Some(crop)) = (features.purpose, features.crop_type) {
            hazards = hazards.scaled_by(crop_vulnerability(crop));
        }

        ClimateExposure {
            hazards,
            weights,
            climate_risk: hazards.weighted_sum(weights),
        }
    }

    /// Borrower multiplier applied to the base default rate.
    pub fn client_factor(&self, features: &FeatureRecord) -> f64 {
        let mut factor = 1.0;

        if features.age < 25 || features.age > 60 {
            factor *= AGE_PENALTY;
        }

        if features.existing_loans > 2 {
            factor *= HEAVY_BORROWER_PENALTY;
        } else if features.existing_loans == 0 {
            factor *= FIRST_LOAN_DISCOUNT;
        }

        let repayment_rate = features.repayment_history / 100.0;
        factor * (2.0 - repayment_rate)
    }
}

impl RiskModel for RuleBasedModel {
    fn predict(&self, features: &FeatureRecord) -> PredictionRecord {
        let exposure = self.climate_exposure(features);
        let risk_score = climate_risk_score(exposure.climate_risk);
        let baseline = BASE_DEFAULT_RATE * self.client_factor(features);
        let probability = DefaultProbability::compose(baseline, risk_score);

        PredictionRecord::assemble(
            risk_score,
            probability,
            exposure.hazards,
            exposure.weights,
            RULE_BASED_CONFIDENCE,
            RULE_BASED_VERSION,
        )
    }

    fn model_version(&self) -> &str {
        RULE_BASED_VERSION
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RuleBased
    }
}
