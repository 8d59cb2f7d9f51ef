//! Boundary between callers and the engines: request schema, validation into feature
//! records, CSV intake, and HTTP routes.

pub mod import;
pub mod request;
pub mod router;

pub use import::{read_applications, read_applications_from_path, ImportError};
pub use request::{
    batch_features, ClientInput, ClimateInput, LoanInput, LocationInput, PredictionRequest,
    ValidationError,
};
pub use router::{assessment_router, BatchPredictionResponse};
