//! Run the model roster over both prediction targets
//!
//! Preparation (encoding, splitting, scaling) happens once per run. Every
//! model is then built fresh for each target, so no fitted state carries
//! over between the two evaluations of a roster entry.

use anyhow::{Context, Result};
use polars::prelude::*;

use super::config::{EncoderFit, PipelineConfig, Target};
use super::encoder::{encode_categoricals, encode_categoricals_on_rows, CategoricalEncoders};
use super::evaluate::{evaluate, Evaluation};
use super::scaler::{standardize, StandardScaler};
use super::split::{split_features, train_test_split, SplitData, TrainTestSplit};
use crate::models::ModelKind;
use crate::report::{ResultRow, ResultsTable};
use crate::utils::create_model_bar;

/// Standardized train/test matrices of one target
#[derive(Debug, Clone)]
pub struct PreparedTarget {
    pub target: Target,
    pub data: SplitData,
    pub scaler: StandardScaler,
}

/// Everything the models need, computed once per run
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub split: TrainTestSplit,
    pub encoders: CategoricalEncoders,
    pub targets: Vec<PreparedTarget>,
}

impl PreparedData {
    pub fn target(&self, target: Target) -> Option<&PreparedTarget> {
        self.targets.iter().find(|p| p.target == target)
    }
}

/// Notifications emitted while the roster runs
#[derive(Debug)]
pub enum RunEvent<'a> {
    Started { model: ModelKind, target: Target },
    Finished(&'a Evaluation),
}

/// Encode categoricals, split rows and standardize features for both
/// targets.
///
/// Both targets share one row partition. Each target's features are every
/// other column, so the fraud features include the late-delivery label and
/// vice versa.
pub fn prepare(df: &DataFrame, config: &PipelineConfig) -> Result<PreparedData> {
    let split = train_test_split(df.height(), config.test_size, config.seed)?;

    let (encoded, encoders) = match config.encoder_fit {
        EncoderFit::FullColumn => encode_categoricals(df, &config.categorical_columns)?,
        EncoderFit::TrainOnly => {
            encode_categoricals_on_rows(df, &config.categorical_columns, &split.train)?
        }
    };

    let targets = Target::ALL
        .into_iter()
        .map(|target| {
            let raw = split_features(&encoded, target.column(), &split)
                .with_context(|| format!("Failed to prepare features for '{}'", target.column()))?;
            let (x_train, x_test, scaler) = standardize(&raw.x_train, &raw.x_test)?;
            Ok(PreparedTarget {
                target,
                data: SplitData {
                    x_train,
                    x_test,
                    ..raw
                },
                scaler,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PreparedData {
        split,
        encoders,
        targets,
    })
}

/// Evaluate every configured model on fraud then late delivery, in roster
/// order, and write the results table once all of them finished.
///
/// The first failure aborts the run and nothing is written.
pub fn run_experiment<F>(
    prepared: &PreparedData,
    config: &PipelineConfig,
    mut on_event: F,
) -> Result<ResultsTable>
where
    F: FnMut(RunEvent<'_>),
{
    let models: Vec<ModelKind> = ModelKind::ROSTER
        .into_iter()
        .filter(|kind| config.models.contains(kind))
        .collect();

    let data_for = |target: Target| {
        prepared
            .target(target)
            .map(|p| &p.data)
            .with_context(|| format!("No prepared data for '{}'", target.column()))
    };
    let fraud_data = data_for(Target::Fraud)?;
    let late_data = data_for(Target::LateDelivery)?;

    let mut results = ResultsTable::default();
    let pb = create_model_bar(models.len() as u64);

    for kind in models {
        let mut run = |target: Target, data: &SplitData| -> Result<Evaluation> {
            pb.suspend(|| on_event(RunEvent::Started { model: kind, target }));
            let eval = evaluate(kind, data, target, config.seed)?;
            pb.suspend(|| on_event(RunEvent::Finished(&eval)));
            Ok(eval)
        };

        let fraud = match run(Target::Fraud, fraud_data) {
            Ok(eval) => eval,
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        };
        let late_delivery = match run(Target::LateDelivery, late_data) {
            Ok(eval) => eval,
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        };

        results.push(ResultRow {
            model: kind,
            fraud,
            late_delivery,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    results.write_tsv(&config.output)?;
    Ok(results)
}
