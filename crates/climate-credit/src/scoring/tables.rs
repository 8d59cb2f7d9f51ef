//! Immutable lookup tables shared by every prediction.

use super::features::{CropType, Hazards, LoanPurpose};

/// Weight row applied to any purpose without its own entry.
pub const FALLBACK_PURPOSE: LoanPurpose = LoanPurpose::SmallBusiness;

/// Vulnerability row applied to any crop without its own entry.
pub const FALLBACK_CROP: CropType = CropType::Other;

/// Hazard weighting per loan purpose. Every row sums to one.
pub const PURPOSE_WEIGHTS: [(LoanPurpose, Hazards); 4] = [
    (LoanPurpose::Agriculture, Hazards::new(0.4, 0.4, 0.2)),
    (LoanPurpose::Livestock, Hazards::new(0.3, 0.5, 0.2)),
    (LoanPurpose::SmallBusiness, Hazards::new(0.5, 0.2, 0.3)),
    (LoanPurpose::Housing, Hazards::new(0.6, 0.1, 0.3)),
];

/// Multiplicative hazard attenuation per crop, used for agricultural loans.
pub const CROP_VULNERABILITY: [(CropType, Hazards); 10] = [
    (CropType::Rice, Hazards::new(0.9, 0.7, 0.5)),
    (CropType::Wheat, Hazards::new(0.5, 0.8, 0.7)),
    (CropType::Maize, Hazards::new(0.6, 0.9, 0.8)),
    (CropType::Coffee, Hazards::new(0.4, 0.7, 0.9)),
    (CropType::Tea, Hazards::new(0.5, 0.6, 0.7)),
    (CropType::Sugarcane, Hazards::new(0.3, 0.8, 0.6)),
    (CropType::Vegetables, Hazards::new(0.7, 0.8, 0.7)),
    (CropType::Fruits, Hazards::new(0.6, 0.7, 0.6)),
    (CropType::Cotton, Hazards::new(0.5, 0.9, 0.8)),
    (CropType::Other, Hazards::new(0.5, 0.5, 0.5)),
];

const FALLBACK_PURPOSE_WEIGHTS: Hazards = PURPOSE_WEIGHTS[2].1;
const FALLBACK_CROP_VULNERABILITY: Hazards = CROP_VULNERABILITY[9].1;

pub fn purpose_weights(purpose: LoanPurpose) -> Hazards {
    PURPOSE_WEIGHTS
        .iter()
        .find(|(candidate, _)| *candidate == purpose)
        .map(|(_, weights)| *weights)
        .unwrap_or(FALLBACK_PURPOSE_WEIGHTS)
}

pub fn crop_vulnerability(crop: CropType) -> Hazards {
    CROP_VULNERABILITY
        .iter()
        .find(|(candidate, _)| *candidate == crop)
        .map(|(_, factors)| *factors)
        .unwrap_or(FALLBACK_CROP_VULNERABILITY)
}
