use serde::{Deserialize, Serialize};

use crate::scoring::{CropType, FeatureRecord, LoanPurpose};

const DEFAULT_REPAYMENT_HISTORY: f64 = 95.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateInput {
    pub flood_risk: f64,
    pub drought_risk: f64,
    pub heatwave_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    pub amount: f64,
    pub purpose: String,
    #[serde(default)]
    pub crop_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInput {
    pub age: i64,
    #[serde(default)]
    pub existing_loans: i64,
    #[serde(default = "default_repayment_history")]
    pub repayment_history: f64,
}

fn default_repayment_history() -> f64 {
    DEFAULT_REPAYMENT_HISTORY
}

/// Loan application as submitted for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub location: LocationInput,
    pub climate: ClimateInput,
    pub loan: LoanInput,
    pub client: ClientInput,
}

/// Reasons a request cannot be turned into a feature record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("loan.amount must be greater than 0, got {0}")]
    NonPositiveAmount(f64),
    #[error("predictions[{index}]: {source}")]
    BatchItem {
        index: usize,
        source: Box<ValidationError>,
    },
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(value)
}

impl PredictionRequest {
    /// Validates every field and flattens the request into a [`FeatureRecord`].
    pub fn into_features(self) -> Result<FeatureRecord, ValidationError> {
        let PredictionRequest {
            location,
            climate,
            loan,
            client,
        } = self;

        let latitude = within("location.latitude", location.latitude, -90.0, 90.0)?;
        let longitude = within("location.longitude", location.longitude, -180.0, 180.0)?;
        let flood_risk = within("climate.flood_risk", climate.flood_risk, 0.0, 1.0)?;
        let drought_risk = within("climate.drought_risk", climate.drought_risk, 0.0, 1.0)?;
        let heatwave_risk = within("climate.heatwave_risk", climate.heatwave_risk, 0.0, 1.0)?;

        if !loan.amount.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "loan.amount",
            });
        }
        if loan.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount(loan.amount));
        }

        let age = u8::try_from(client.age)
            .ok()
            .filter(|age| (18..=100).contains(age))
            .ok_or(ValidationError::OutOfRange {
                field: "client.age",
                min: 18.0,
                max: 100.0,
                value: client.age as f64,
            })?;

        let existing_loans =
            u32::try_from(client.existing_loans).map_err(|_| ValidationError::BelowMinimum {
                field: "client.existing_loans",
                min: 0,
                value: client.existing_loans,
            })?;

        let repayment_history = within(
            "client.repayment_history",
            client.repayment_history,
            0.0,
            100.0,
        )?;

        Ok(FeatureRecord {
            flood_risk,
            drought_risk,
            heatwave_risk,
            purpose: LoanPurpose::from_label(&loan.purpose),
            crop_type: CropType::from_label(loan.crop_type.as_deref()),
            age,
            existing_loans,
            repayment_history,
            latitude,
            longitude,
            amount: loan.amount,
        })
    }
}

/// Validates a batch, reporting the first failing position.
pub fn batch_features(
    requests: Vec<PredictionRequest>,
) -> Result<Vec<FeatureRecord>, ValidationError> {
    requests
        .into_iter()
        .enumerate()
        .map(|(index, request)| {
            request
                .into_features()
                .map_err(|source| ValidationError::BatchItem {
                    index,
                    source: Box::new(source),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PredictionRequest {
        PredictionRequest {
            location: LocationInput {
                latitude: 23.81,
                longitude: 90.41,
            },
            climate: ClimateInput {
                flood_risk: 0.8,
                drought_risk: 0.2,
                heatwave_risk: 0.1,
            },
            loan: LoanInput {
                amount: 50_000.0,
                purpose: "housing".to_string(),
                crop_type: None,
            },
            client: ClientInput {
                age: 40,
                existing_loans: 1,
                repayment_history: 95.0,
            },
        }
    }

    #[test]
    fn normalizes_a_valid_request() {
        let features = request().into_features().expect("valid request");

        assert_eq!(features.purpose, LoanPurpose::Housing);
        assert_eq!(features.crop_type, None);
        assert_eq!(features.age, 40);
        assert_eq!(features.existing_loans, 1);
        assert_eq!(features.flood_risk, 0.8);
        assert_eq!(features.amount, 50_000.0);
    }

    #[test]
    fn client_defaults_apply_when_fields_are_omitted() {
        let payload = serde_json::json!({
            "location": { "latitude": 0.0, "longitude": 0.0 },
            "climate": { "flood_risk": 0.1, "drought_risk": 0.1, "heatwave_risk": 0.1 },
            "loan": { "amount": 1000.0, "purpose": "livestock" },
            "client": { "age": 30 }
        });

        let request: PredictionRequest = serde_json::from_value(payload).expect("deserializes");
        let features = request.into_features().expect("valid request");

        assert_eq!(features.existing_loans, 0);
        assert_eq!(features.repayment_history, 95.0);
        assert_eq!(features.crop_type, None);
    }

    #[test]
    fn empty_crop_label_counts_as_absent() {
        let mut blank = request();
        blank.loan.purpose = "agriculture".to_string();
        blank.loan.crop_type = Some(String::new());
        assert_eq!(blank.into_features().expect("valid request").crop_type, None);

        let mut unknown = request();
        unknown.loan.crop_type = Some("quinoa".to_string());
        assert_eq!(
            unknown.into_features().expect("valid request").crop_type,
            Some(CropType::Other)
        );
    }

    #[test]
    fn rejects_hazards_outside_unit_interval() {
        let mut invalid = request();
        invalid.climate.drought_risk = 1.2;

        match invalid.into_features() {
            Err(ValidationError::OutOfRange { field, .. }) => {
                assert_eq!(field, "climate.drought_risk")
            }
            other => panic!("expected range violation, got {other:?}"),
        }
    }

    #[test]
    fn rejects_underage_and_overage_borrowers() {
        for age in [17, 101, -3, 300] {
            let mut invalid = request();
            invalid.client.age = age;
            let err = invalid.into_features().expect_err("age out of range");
            assert!(err.to_string().starts_with("client.age"), "{err}");
        }

        for age in [18, 100] {
            let mut valid = request();
            valid.client.age = age;
            assert!(valid.into_features().is_ok());
        }
    }

    #[test]
    fn rejects_negative_existing_loans() {
        let mut invalid = request();
        invalid.client.existing_loans = -1;
        assert_eq!(
            invalid.into_features(),
            Err(ValidationError::BelowMinimum {
                field: "client.existing_loans",
                min: 0,
                value: -1,
            })
        );
    }

    #[test]
    fn rejects_non_positive_amount_and_bad_coordinates() {
        let mut invalid = request();
        invalid.loan.amount = 0.0;
        assert_eq!(
            invalid.into_features(),
            Err(ValidationError::NonPositiveAmount(0.0))
        );

        let mut invalid = request();
        invalid.location.longitude = 181.0;
        assert!(invalid.into_features().is_err());

        let mut invalid = request();
        invalid.client.repayment_history = f64::NAN;
        assert_eq!(
            invalid.into_features(),
            Err(ValidationError::NotFinite {
                field: "client.repayment_history"
            })
        );
    }

    #[test]
    fn batch_errors_name_the_failing_index() {
        let mut invalid = request();
        invalid.climate.heatwave_risk = -0.1;

        let err = batch_features(vec![request(), invalid]).expect_err("second item invalid");

        assert!(matches!(err, ValidationError::BatchItem { index: 1, .. }));
        assert!(err.to_string().starts_with("predictions[1]: climate.heatwave_risk"));
    }
}
