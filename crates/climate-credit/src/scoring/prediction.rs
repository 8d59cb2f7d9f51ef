use serde::{Deserialize, Serialize};

use super::features::Hazards;

const PROBABILITY_PLACES: usize = 4;
const RISK_FACTOR_PLACES: usize = 3;

/// Upper bound of the client-only default estimate.
pub const BASELINE_CAP: f64 = 0.5;
/// Upper bound once the full climate impact is added.
pub const UNADJUSTED_CAP: f64 = 0.65;
/// Upper bound once the dampened climate impact is added.
pub const ADJUSTED_CAP: f64 = 0.5;
/// Default probability added by a climate risk score of 100.
pub const CLIMATE_IMPACT_SCALE: f64 = 0.25;
/// Share of the climate impact that survives mitigating interventions.
pub const MITIGATED_SHARE: f64 = 0.65;

/// Underwriting recommendation derived from the climate risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Approve,
    Caution,
    Defer,
}

impl Recommendation {
    /// Bands are `0..=35`, `36..=65`, and `66..`.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=35 => Self::Approve,
            36..=65 => Self::Caution,
            _ => Self::Defer,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Caution => "caution",
            Self::Defer => "defer",
        }
    }
}

/// Converts a weighted climate risk into the 0..=100 score, truncating toward zero.
pub fn climate_risk_score(climate_risk: f64) -> u8 {
    (climate_risk * 100.0).clamp(0.0, 100.0) as u8
}

/// Default probability at increasing levels of climate-risk incorporation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultProbability {
    pub baseline: f64,
    pub unadjusted: f64,
    pub adjusted: f64,
}

impl DefaultProbability {
    /// Layers the climate impact of `risk_score` over a client-only estimate.
    pub fn compose(baseline: f64, risk_score: u8) -> Self {
        let baseline = baseline.min(BASELINE_CAP);
        let climate_impact = (f64::from(risk_score) / 100.0) * CLIMATE_IMPACT_SCALE;

        Self {
            baseline,
            unadjusted: (baseline + climate_impact).min(UNADJUSTED_CAP),
            adjusted: (baseline + climate_impact * MITIGATED_SHARE).min(ADJUSTED_CAP),
        }
    }

    fn rounded(self) -> Self {
        Self {
            baseline: round_to(self.baseline, PROBABILITY_PLACES),
            unadjusted: round_to(self.unadjusted, PROBABILITY_PLACES),
            adjusted: round_to(self.adjusted, PROBABILITY_PLACES),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub value: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub flood: RiskFactor,
    pub drought: RiskFactor,
    pub heatwave: RiskFactor,
}

impl RiskFactors {
    fn from_parts(values: Hazards, weights: Hazards) -> Self {
        let factor = |value: f64, weight: f64| RiskFactor {
            value: round_to(value, RISK_FACTOR_PLACES),
            weight,
        };

        Self {
            flood: factor(values.flood, weights.flood),
            drought: factor(values.drought, weights.drought),
            heatwave: factor(values.heatwave, weights.heatwave),
        }
    }
}

/// Result of scoring one feature record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub climate_risk_score: u8,
    pub default_probability: DefaultProbability,
    pub risk_factors: RiskFactors,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub model_version: String,
}

impl PredictionRecord {
    /// Builds the emitted record. Display rounding happens here and nowhere earlier.
    pub(crate) fn assemble(
        risk_score: u8,
        probability: DefaultProbability,
        hazard_values: Hazards,
        hazard_weights: Hazards,
        confidence: f64,
        model_version: &str,
    ) -> Self {
        let risk_score = risk_score.min(100);
        Self {
            climate_risk_score: risk_score,
            default_probability: probability.rounded(),
            risk_factors: RiskFactors::from_parts(hazard_values, hazard_weights),
            recommendation: Recommendation::from_score(risk_score),
            confidence,
            model_version: model_version.to_string(),
        }
    }
}

/// Rounds the exact binary value to `places` decimals. Scaling by a power of ten
/// first can turn a value such as 0.24624999... into a tie.
fn round_to(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}
