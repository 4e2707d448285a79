//! Two-class linear discriminant analysis

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use super::linalg::{add_ridge, solve};
use super::{check_fit_input, check_predict_input, Classifier, ModelResult};
use crate::error::PipelineError;

const NAME: &str = "LinearDiscriminantAnalysis";

/// Relative ridge added to the pooled covariance. Collinear features
/// (duplicated id columns, identical price columns) make it singular.
const COVARIANCE_RIDGE: f64 = 1e-6;

/// Gaussian classes sharing one covariance matrix, priors from class
/// frequencies. The decision rule is `x . w + b > 0` with
/// `w = S^-1 (mu1 - mu0)` and `b = -0.5 (mu0 + mu1) . w + ln(pi1 / pi0)`.
#[derive(Debug, Clone, Default)]
pub struct LinearDiscriminantAnalysis {
    weights: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearDiscriminantAnalysis {
    #[cfg(test)]
    fn coefficients(&self) -> Option<(&Array1<f64>, f64)> {
        self.weights.as_ref().map(|w| (w, self.intercept))
    }
}

impl Classifier for LinearDiscriminantAnalysis {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()> {
        let counts = check_fit_input(NAME, x, y, true)?;
        let (n, d) = x.dim();

        let rows_of = |class: u8| -> Vec<usize> { (0..n).filter(|&i| y[i] == class).collect() };
        let x0 = x.select(Axis(0), &rows_of(0));
        let x1 = x.select(Axis(0), &rows_of(1));

        let mean0 = x0
            .mean_axis(Axis(0))
            .ok_or(PipelineError::SingleClass { model: NAME, class: 1 })?;
        let mean1 = x1
            .mean_axis(Axis(0))
            .ok_or(PipelineError::SingleClass { model: NAME, class: 0 })?;

        // Pooled within-class scatter divided by n
        let centered0 = &x0 - &mean0;
        let centered1 = &x1 - &mean1;
        let mut covariance =
            (centered0.t().dot(&centered0) + centered1.t().dot(&centered1)) / n as f64;

        let mean_variance = covariance.diag().sum() / d.max(1) as f64;
        add_ridge(&mut covariance, COVARIANCE_RIDGE * mean_variance.max(1e-12));

        let delta = &mean1 - &mean0;
        let weights =
            solve(covariance, delta).ok_or(PipelineError::SingularCovariance { model: NAME })?;

        let midpoint = (&mean0 + &mean1) * 0.5;
        let log_prior_ratio = (counts[1] as f64 / counts[0] as f64).ln();
        self.intercept = -midpoint.dot(&weights) + log_prior_ratio;
        self.weights = Some(weights);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<u8>> {
        let w = self
            .weights
            .as_ref()
            .ok_or(PipelineError::NotFitted { model: NAME })?;
        check_predict_input(NAME, x, Some(w.len()))?;
        Ok((x.dot(w) + self.intercept).mapv(|z| u8::from(z > 0.0)))
    }
}
