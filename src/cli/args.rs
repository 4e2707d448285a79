//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::models::ModelKind;
use crate::pipeline::{EncoderFit, PipelineConfig};

/// supplyrisk - Train and compare fraud and late-delivery classifiers on
/// DataCo supply-chain orders
#[derive(Parser, Debug)]
#[command(name = "supplyrisk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input CSV file with the DataCo order columns
    #[arg(short, long, default_value = "data/DataCoSupplyChainDataset.csv")]
    pub input: PathBuf,

    /// Tab-separated results file, one row per model
    #[arg(short, long, default_value = "model_results.txt")]
    pub output: PathBuf,

    /// Also write every evaluation (with confusion matrices and run
    /// metadata) to this JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Seed for the train/test split and the randomized models
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Share of rows held out for testing, strictly between 0 and 1
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Where categorical encoders learn their vocabulary.
    /// "full-column" fits on every row before splitting; "train-only" fits
    /// on training rows and gives unseen test values a reserved code.
    #[arg(long, value_enum, default_value_t = EncoderFit::FullColumn)]
    pub encoder_fit: EncoderFit,

    /// Models to run (comma-separated). Roster order is kept regardless of
    /// the order given here. Default: all nine.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub models: Vec<ModelKind>,

    /// Number of rows to use for schema inference.
    /// Use 0 for a full table scan.
    #[arg(long, default_value = "0")]
    pub infer_schema_length: usize,
}

impl Cli {
    /// Pipeline configuration with the flags applied over the defaults
    pub fn to_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            input: self.input.clone(),
            output: self.output.clone(),
            json_output: self.json.clone(),
            test_size: self.test_size,
            seed: self.seed,
            encoder_fit: self.encoder_fit,
            models: if self.models.is_empty() {
                defaults.models.clone()
            } else {
                self.models.clone()
            },
            ..defaults
        }
    }
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}
