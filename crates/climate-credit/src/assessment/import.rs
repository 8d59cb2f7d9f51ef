//! CSV intake for offline batch scoring.
//!
//! One application per row with the columns `latitude, longitude, flood_risk,
//! drought_risk, heatwave_risk, amount, purpose, crop_type, age, existing_loans,
//! repayment_history`. Empty optional cells take the same defaults as the HTTP API.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::request::{ClientInput, ClimateInput, LoanInput, LocationInput, PredictionRequest};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    latitude: f64,
    longitude: f64,
    flood_risk: f64,
    drought_risk: f64,
    heatwave_risk: f64,
    amount: f64,
    purpose: String,
    #[serde(default)]
    crop_type: Option<String>,
    age: i64,
    #[serde(default)]
    existing_loans: Option<i64>,
    #[serde(default)]
    repayment_history: Option<f64>,
}

impl From<ApplicationRow> for PredictionRequest {
    fn from(row: ApplicationRow) -> Self {
        PredictionRequest {
            location: LocationInput {
                latitude: row.latitude,
                longitude: row.longitude,
            },
            climate: ClimateInput {
                flood_risk: row.flood_risk,
                drought_risk: row.drought_risk,
                heatwave_risk: row.heatwave_risk,
            },
            loan: LoanInput {
                amount: row.amount,
                purpose: row.purpose,
                crop_type: row.crop_type,
            },
            client: ClientInput {
                age: row.age,
                existing_loans: row.existing_loans.unwrap_or(0),
                repayment_history: row.repayment_history.unwrap_or(95.0),
            },
        }
    }
}

/// Reads loan applications from CSV. Rows are numbered from 1, excluding the header.
pub fn read_applications<R: Read>(reader: R) -> Result<Vec<PredictionRequest>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<ApplicationRow>()
        .enumerate()
        .map(|(index, row)| {
            row.map(PredictionRequest::from)
                .map_err(|source| ImportError::Row {
                    row: index + 1,
                    source,
                })
        })
        .collect()
}

pub fn read_applications_from_path(path: &Path) -> Result<Vec<PredictionRequest>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_applications(file)
}
