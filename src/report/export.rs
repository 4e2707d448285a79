//! JSON export of a full run

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use super::results::ResultsTable;
use crate::pipeline::{Evaluation, PipelineConfig, PreparedData};

/// Metadata about the run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub version: String,
    pub input_file: String,
    pub results_file: String,
    pub seed: u64,
    pub test_size: f64,
    pub encoder_fit: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_count: usize,
}

/// Sizes of the prepared partitions, reported in the metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitSizes {
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_count: usize,
}

impl From<&PreparedData> for SplitSizes {
    fn from(prepared: &PreparedData) -> Self {
        Self {
            train_rows: prepared.split.train.len(),
            test_rows: prepared.split.test.len(),
            feature_count: prepared
                .targets
                .first()
                .map(|t| t.data.feature_names.len())
                .unwrap_or(0),
        }
    }
}

#[derive(Serialize)]
pub struct RunExport<'a> {
    pub metadata: RunMetadata,
    /// Every evaluation, in the order it ran
    pub evaluations: Vec<&'a Evaluation>,
}

/// Write run metadata and every evaluation (confusion matrices included)
pub fn export_results_json(
    results: &ResultsTable,
    config: &PipelineConfig,
    sizes: SplitSizes,
    output_path: &Path,
) -> Result<()> {
    let evaluations = results
        .rows
        .iter()
        .flat_map(|row| [&row.fraud, &row.late_delivery])
        .collect();

    let export = RunExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: config.input.display().to_string(),
            results_file: config.output.display().to_string(),
            seed: config.seed,
            test_size: config.test_size,
            encoder_fit: config.encoder_fit.to_string(),
            train_rows: sizes.train_rows,
            test_rows: sizes.test_rows,
            feature_count: sizes.feature_count,
        },
        evaluations,
    };

    let json =
        serde_json::to_string_pretty(&export).context("Failed to serialize results to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write results to {}", output_path.display()))?;

    Ok(())
}
