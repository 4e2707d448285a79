//! L2-regularized logistic regression backed by smartcore

use ndarray::{Array1, ArrayView1, ArrayView2};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{
    LogisticRegression as LogRegModel, LogisticRegressionParameters,
};

use super::dense::{failed, from_labels, to_dense, to_labels};
use super::{check_fit_input, check_predict_input, Classifier, ModelResult};
use crate::error::PipelineError;

const NAME: &str = "LogisticRegression";

type Model = LogRegModel<f64, u32, DenseMatrix<f64>, Vec<u32>>;

/// Penalty `0.5 * alpha * |w|^2` on the log-loss; the intercept is not
/// penalized.
pub struct LogisticRegression {
    pub alpha: f64,
    model: Option<Model>,
    n_features: Option<usize>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            model: None,
            n_features: None,
        }
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()> {
        check_fit_input(NAME, x, y, true)?;
        self.model = None;
        self.n_features = None;

        let params = LogisticRegressionParameters::default().with_alpha(self.alpha);
        let model =
            Model::fit(&to_dense(NAME, x)?, &to_labels(y), params).map_err(|e| failed(NAME, e))?;

        self.model = Some(model);
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<u8>> {
        check_predict_input(NAME, x, self.n_features)?;
        let model = self
            .model
            .as_ref()
            .ok_or(PipelineError::NotFitted { model: NAME })?;
        if x.nrows() == 0 {
            return Ok(Array1::zeros(0));
        }

        let labels = model
            .predict(&to_dense(NAME, x)?)
            .map_err(|e| failed(NAME, e))?;
        Ok(from_labels(labels))
    }
}
