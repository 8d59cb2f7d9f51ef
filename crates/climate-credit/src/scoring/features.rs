use serde::{Deserialize, Serialize};

/// Loan purposes with a dedicated hazard weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    Agriculture,
    Livestock,
    SmallBusiness,
    Housing,
    /// Any purpose outside the known set. Weighted like small business.
    #[serde(other)]
    Unrecognized,
}

impl LoanPurpose {
    /// Labels are matched exactly; anything else is `Unrecognized`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "agriculture" => Self::Agriculture,
            "livestock" => Self::Livestock,
            "small_business" => Self::SmallBusiness,
            "housing" => Self::Housing,
            _ => Self::Unrecognized,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Agriculture => "agriculture",
            Self::Livestock => "livestock",
            Self::SmallBusiness => "small_business",
            Self::Housing => "housing",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Crops with a known hazard vulnerability profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Rice,
    Wheat,
    Maize,
    Coffee,
    Tea,
    Sugarcane,
    Vegetables,
    Fruits,
    Cotton,
    #[serde(other)]
    Other,
}

impl CropType {
    /// An absent or empty label means no crop was supplied. Any other label that
    /// is not matched exactly resolves to `Other`.
    pub fn from_label(label: Option<&str>) -> Option<Self> {
        let crop = match label.filter(|label| !label.is_empty())? {
            "rice" => Self::Rice,
            "wheat" => Self::Wheat,
            "maize" => Self::Maize,
            "coffee" => Self::Coffee,
            "tea" => Self::Tea,
            "sugarcane" => Self::Sugarcane,
            "vegetables" => Self::Vegetables,
            "fruits" => Self::Fruits,
            "cotton" => Self::Cotton,
            _ => Self::Other,
        };
        Some(crop)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rice => "rice",
            Self::Wheat => "wheat",
            Self::Maize => "maize",
            Self::Coffee => "coffee",
            Self::Tea => "tea",
            Self::Sugarcane => "sugarcane",
            Self::Vegetables => "vegetables",
            Self::Fruits => "fruits",
            Self::Cotton => "cotton",
            Self::Other => "other",
        }
    }
}

/// One value per climate hazard.
///
/// Used for raw hazard magnitudes as well as for the purpose weight and crop
/// vulnerability rows that scale them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazards {
    pub flood: f64,
    pub drought: f64,
    pub heatwave: f64,
}

impl Hazards {
    pub const fn new(flood: f64, drought: f64, heatwave: f64) -> Self {
        Self {
            flood,
            drought,
            heatwave,
        }
    }

    /// Component-wise product.
    pub fn scaled_by(self, factors: Hazards) -> Self {
        Self {
            flood: self.flood * factors.flood,
            drought: self.drought * factors.drought,
            heatwave: self.heatwave * factors.heatwave,
        }
    }

    /// Sum of each hazard times its weight, accumulated flood, drought, heatwave.
    pub fn weighted_sum(self, weights: Hazards) -> f64 {
        self.flood * weights.flood
            + self.drought * weights.drought
            + self.heatwave * weights.heatwave
    }

    pub fn total(self) -> f64 {
        self.flood + self.drought + self.heatwave
    }
}

/// Normalized, validated input to a risk engine.
///
/// Location and amount travel with the record for engines that use them; the
/// rule-based engine ignores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub flood_risk: f64,
    pub drought_risk: f64,
    pub heatwave_risk: f64,
    pub purpose: LoanPurpose,
    /// `None` when the application named no crop.
    pub crop_type: Option<CropType>,
    pub age: u8,
    pub existing_loans: u32,
    pub repayment_history: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub amount: f64,
}

impl FeatureRecord {
    pub fn hazards(&self) -> Hazards {
        Hazards::new(self.flood_risk, self.drought_risk, self.heatwave_risk)
    }
}
