use clap::Args;
use climate_credit::assessment::{
    batch_features, read_applications_from_path, ClientInput, ClimateInput, LoanInput,
    LocationInput, PredictionRequest,
};
use climate_credit::config::AppConfig;
use climate_credit::error::AppError;
use climate_credit::scoring::{load_model, predict_batch, PredictionRecord, RiskModel, TrainedModel};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Latitude of the financed asset
    #[arg(long, allow_hyphen_values = true)]
    latitude: f64,
    /// Longitude of the financed asset
    #[arg(long, allow_hyphen_values = true)]
    longitude: f64,
    /// Flood hazard (0-1)
    #[arg(long)]
    flood_risk: f64,
    /// Drought hazard (0-1)
    #[arg(long)]
    drought_risk: f64,
    /// Heatwave hazard (0-1)
    #[arg(long)]
    heatwave_risk: f64,
    /// Requested loan amount
    #[arg(long)]
    amount: f64,
    /// Loan purpose (agriculture, livestock, small_business, housing)
    #[arg(long)]
    purpose: String,
    /// Crop grown, for agricultural loans
    #[arg(long)]
    crop_type: Option<String>,
    /// Borrower age in years
    #[arg(long, allow_hyphen_values = true)]
    age: i64,
    /// Number of loans the borrower already holds
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    existing_loans: i64,
    /// Share of past installments repaid on time (0-100)
    #[arg(long, default_value_t = 95.0)]
    repayment_history: f64,
    /// Trained model artifact to score with; must load successfully
    #[arg(long)]
    model_path: Option<PathBuf>,
    /// Print the prediction as JSON
    #[arg(long)]
    json: bool,
}

impl ScoreArgs {
    pub(crate) fn to_request(&self) -> PredictionRequest {
        PredictionRequest {
            location: LocationInput {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            climate: ClimateInput {
                flood_risk: self.flood_risk,
                drought_risk: self.drought_risk,
                heatwave_risk: self.heatwave_risk,
            },
            loan: LoanInput {
                amount: self.amount,
                purpose: self.purpose.clone(),
                crop_type: self.crop_type.clone(),
            },
            client: ClientInput {
                age: self.age,
                existing_loans: self.existing_loans,
                repayment_history: self.repayment_history,
            },
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with one loan application per row
    #[arg(long)]
    input: PathBuf,
    /// Trained model artifact to score with; must load successfully
    #[arg(long)]
    model_path: Option<PathBuf>,
    /// Emit one JSON prediction per line instead of a table
    #[arg(long)]
    json: bool,
}

/// An explicit artifact must load; otherwise follow the service's startup selection.
fn select_model(model_path: Option<&Path>) -> Result<Arc<dyn RiskModel>, AppError> {
    match model_path {
        Some(path) => Ok(Arc::new(TrainedModel::from_path(path)?)),
        None => {
            let config = AppConfig::load()?;
            Ok(load_model(&config.model.artifact_path))
        }
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let features = args.to_request().into_features()?;
    let model = select_model(args.model_path.as_deref())?;
    let prediction = model.predict(&features);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        render_prediction(&prediction);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let requests = read_applications_from_path(&args.input)?;
    let records = batch_features(requests)?;
    let model = select_model(args.model_path.as_deref())?;
    let predictions = predict_batch(model.as_ref(), &records);

    if args.json {
        for prediction in &predictions {
            println!("{}", serde_json::to_string(prediction)?);
        }
    } else {
        render_batch(&args.input, model.model_version(), &predictions);
    }
    Ok(())
}

fn render_prediction(prediction: &PredictionRecord) {
    println!("Climate risk assessment");
    println!(
        "Model: {} (confidence {:.2})",
        prediction.model_version, prediction.confidence
    );
    println!(
        "Climate risk score: {} -> {}",
        prediction.climate_risk_score,
        prediction.recommendation.label()
    );

    let probability = &prediction.default_probability;
    println!("\nDefault probability");
    println!("- baseline: {:.4}", probability.baseline);
    println!("- unadjusted: {:.4}", probability.unadjusted);
    println!("- adjusted: {:.4}", probability.adjusted);

    let factors = &prediction.risk_factors;
    println!("\nRisk factors");
    for (hazard, factor) in [
        ("flood", factors.flood),
        ("drought", factors.drought),
        ("heatwave", factors.heatwave),
    ] {
        println!(
            "- {hazard}: value {:.3}, weight {:.2}",
            factor.value, factor.weight
        );
    }
}

fn render_batch(input: &Path, model_version: &str, predictions: &[PredictionRecord]) {
    println!(
        "Scored {} application(s) from {} with {}",
        predictions.len(),
        input.display(),
        model_version
    );

    if predictions.is_empty() {
        return;
    }

    println!(
        "\n{:>4}  {:>5}  {:<14}  {:>8}  {:>10}  {:>8}",
        "row", "score", "recommendation", "baseline", "unadjusted", "adjusted"
    );
    for (index, prediction) in predictions.iter().enumerate() {
        let probability = &prediction.default_probability;
        println!(
            "{:>4}  {:>5}  {:<14}  {:>8.4}  {:>10.4}  {:>8.4}",
            index + 1,
            prediction.climate_risk_score,
            prediction.recommendation.label(),
            probability.baseline,
            probability.unadjusted,
            probability.adjusted
        );
    }
}
