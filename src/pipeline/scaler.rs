//! Standardization fit on the training partition

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::PipelineError;

/// Standard deviations below this are treated as zero
const MIN_STD: f64 = 1e-12;

/// Per-column mean and scale learned from one matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Learn column means and population standard deviations. Constant
    /// columns get a scale of 1 so they map to zero instead of NaN.
    pub fn fit(x: ArrayView2<'_, f64>) -> Result<Self, PipelineError> {
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyTrainingSet {
                model: "StandardScaler",
            });
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or(PipelineError::EmptyTrainingSet {
                model: "StandardScaler",
            })?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s < MIN_STD { 1.0 } else { s });

        Ok(Self { mean, scale })
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Apply the stored statistics; never refits
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, PipelineError> {
        if x.ncols() != self.mean.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.mean.len(),
                found: x.ncols(),
            });
        }
        Ok((&x - &self.mean) / &self.scale)
    }
}

/// Fit on `train`, then transform both matrices with the train statistics
pub fn standardize(
    train: &Array2<f64>,
    test: &Array2<f64>,
) -> Result<(Array2<f64>, Array2<f64>, StandardScaler), PipelineError> {
    let scaler = StandardScaler::fit(train.view())?;
    let train_scaled = scaler.transform(train.view())?;
    let test_scaled = scaler.transform(test.view())?;
    Ok((train_scaled, test_scaled, scaler))
}
