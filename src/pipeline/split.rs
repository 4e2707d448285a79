//! Train/test partitioning and conversion to dense matrices

use anyhow::Result;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::PipelineError;

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Features and labels of one target, partitioned into train and test
#[derive(Debug, Clone)]
pub struct SplitData {
    pub feature_names: Vec<String>,
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<u8>,
    pub y_test: Array1<u8>,
}

/// Shuffle row indices with a seeded RNG and cut off the test share.
///
/// The test partition holds `ceil(test_size * n_rows)` rows and the train
/// partition the rest. The same `(n_rows, test_size, seed)` always yields the
/// same partitions.
pub fn train_test_split(n_rows: usize, test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        anyhow::bail!(PipelineError::InvalidSplit(format!(
            "test size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_test = (test_size * n_rows as f64).ceil() as usize;
    let n_train = n_rows.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        anyhow::bail!(PipelineError::InvalidSplit(format!(
            "{} rows with test size {} leaves an empty partition",
            n_rows, test_size
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

/// Convert the named columns into a row-major `f64` matrix.
///
/// Fails on non-numeric columns and on nulls; the classifiers accept neither.
pub fn feature_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let col_data = columns
        .iter()
        .map(|name| numeric_values(df.column(name)?))
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn(
        (df.height(), columns.len()),
        |(r, c)| col_data[c][r],
    ))
}

fn numeric_values(column: &Column) -> Result<Vec<f64>> {
    let dtype = column.dtype();
    if !(dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean)) {
        anyhow::bail!(PipelineError::NonNumericFeature {
            column: column.name().to_string(),
            dtype: dtype.to_string(),
        });
    }

    let nulls = column.null_count();
    if nulls > 0 {
        anyhow::bail!(PipelineError::MissingValues {
            column: column.name().to_string(),
            count: nulls,
        });
    }

    let floats = column.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_no_null_iter().collect())
}

/// Read a 0/1 label column
pub fn label_vector(df: &DataFrame, target: &str) -> Result<Array1<u8>> {
    let column = df.column(target)?;
    let values = numeric_values(column)?;

    values
        .into_iter()
        .map(|v| {
            if v == 0.0 {
                Ok(0)
            } else if v == 1.0 {
                Ok(1)
            } else {
                Err(PipelineError::InvalidLabel {
                    column: target.to_string(),
                    value: v.to_string(),
                }
                .into())
            }
        })
        .collect()
}

/// Separate `target` from the other columns and partition both by `split`.
///
/// Every column except `target` becomes a feature, in frame order.
pub fn split_features(df: &DataFrame, target: &str, split: &TrainTestSplit) -> Result<SplitData> {
    let feature_names: Vec<String> = df
        .get_column_names()
        .iter()
        .filter(|name| name.as_str() != target)
        .map(|name| name.to_string())
        .collect();

    let x = feature_matrix(df, &feature_names)?;
    let y = label_vector(df, target)?;

    Ok(SplitData {
        feature_names,
        x_train: x.select(Axis(0), &split.train),
        x_test: x.select(Axis(0), &split.test),
        y_train: y.select(Axis(0), &split.train),
        y_test: y.select(Axis(0), &split.test),
    })
}
