use crate::scoring::features::{CropType, FeatureRecord, LoanPurpose};
use crate::scoring::trained::{FeatureName, LogisticTerm, ModelArtifact};
use std::collections::BTreeMap;

pub(super) fn features(
    purpose: LoanPurpose,
    flood: f64,
    drought: f64,
    heatwave: f64,
) -> FeatureRecord {
    FeatureRecord {
        flood_risk: flood,
        drought_risk: drought,
        heatwave_risk: heatwave,
        purpose,
        crop_type: None,
        age: 40,
        existing_loans: 1,
        repayment_history: 95.0,
        latitude: 23.81,
        longitude: 90.41,
        amount: 50_000.0,
    }
}

pub(super) fn housing_features() -> FeatureRecord {
    features(LoanPurpose::Housing, 0.8, 0.2, 0.1)
}

pub(super) fn rice_features() -> FeatureRecord {
    FeatureRecord {
        crop_type: Some(CropType::Rice),
        ..features(LoanPurpose::Agriculture, 1.0, 1.0, 1.0)
    }
}

pub(super) fn artifact() -> ModelArtifact {
    ModelArtifact {
        model_version: "logit-2024.06".to_string(),
        confidence: 0.92,
        climate: LogisticTerm {
            intercept: -2.0,
            coefficients: BTreeMap::from([
                (FeatureName::FloodRisk, 2.0),
                (FeatureName::DroughtRisk, 1.5),
                (FeatureName::HeatwaveRisk, -0.5),
            ]),
        },
        default: LogisticTerm {
            intercept: -1.0,
            coefficients: BTreeMap::from([
                (FeatureName::RepaymentHistory, -0.01),
                (FeatureName::ExistingLoans, 0.1),
            ]),
        },
    }
}
