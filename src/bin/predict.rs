//! Batch predictor for pre-built flow feature rows.
//!
//! Usage:
//!   nids-predict --vector 80,6,120000,...
//!   nids-predict --file flows.csv
//!   nids-predict --file flows.csv --save predictions.csv

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use nids_backend_core::app_config::AppConfig;
use nids_backend_core::services::batch_predict::{
    parse_vector, score_csv, score_vector, to_csv, PREVIEW_ROWS,
};
use nids_backend_core::services::{load_feature_columns, ModelArtifacts};

#[derive(Parser)]
#[command(name = "nids-predict")]
#[command(about = "Score flow feature rows with the trained NIDS model")]
struct Cli {
    /// CSV file with one flow per row and a header naming the features
    #[arg(long, conflicts_with = "vector")]
    file: Option<PathBuf>,

    /// Single sample as comma separated values
    #[arg(long, allow_hyphen_values = true)]
    vector: Option<String>,

    /// Write `prediction,confidence` rows here instead of printing
    #[arg(long, requires = "file")]
    save: Option<PathBuf>,

    /// Classifier artifact (defaults to MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Scaler artifact (defaults to SCALER_PATH)
    #[arg(long)]
    scaler: Option<PathBuf>,

    /// Feature column list (defaults to FEATURE_COLUMNS_PATH)
    #[arg(long)]
    columns: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if cli.file.is_none() && cli.vector.is_none() {
        bail!("Either --file or --vector is required (see --help)");
    }

    let config = AppConfig::from_env()?;
    let model_path = cli
        .model
        .unwrap_or_else(|| PathBuf::from(&config.models.model_path));
    let scaler_path = cli
        .scaler
        .unwrap_or_else(|| PathBuf::from(&config.models.scaler_path));
    let columns_path = cli
        .columns
        .unwrap_or_else(|| PathBuf::from(&config.models.feature_columns_path));

    eprintln!("[*] Loading model from {}...", model_path.display());
    let artifacts = ModelArtifacts::load(&model_path, &scaler_path)
        .context("Model not found or invalid. Train and export the model first.")?;

    if let Some(vector) = cli.vector {
        // The column list is optional for single vectors
        let expected = load_feature_columns(&columns_path).ok().map(|c| c.len());
        let values = parse_vector(&vector, expected)?;
        let row = score_vector(&artifacts, &values)?;
        println!(
            "Prediction: {} (confidence: {:.3})",
            row.verdict, row.confidence
        );
        return Ok(());
    }

    let Some(file) = cli.file else {
        return Ok(());
    };

    let columns = load_feature_columns(&columns_path).with_context(|| {
        format!("Feature columns metadata not found at {}", columns_path.display())
    })?;
    eprintln!("[*] Expecting {} features", columns.len());

    eprintln!("[*] Loading and predicting from file: {}", file.display());
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let rows = score_csv(&artifacts, &content, &columns)?;

    match cli.save {
        Some(save) => {
            std::fs::write(&save, to_csv(&rows))
                .with_context(|| format!("Failed to write {}", save.display()))?;
            eprintln!("[*] Saved predictions to {}", save.display());
        },
        None => {
            for (i, row) in rows.iter().take(PREVIEW_ROWS).enumerate() {
                println!("Row {}: {} (confidence: {:.3})", i, row.verdict, row.confidence);
            }
        },
    }

    eprintln!("[*] Processed {} rows", rows.len());
    Ok(())
}
