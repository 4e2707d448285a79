//! Gaussian naive Bayes

use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::{check_fit_input, check_predict_input, Classifier, ModelResult};

const NAME: &str = "GaussianNB";

/// Per-class feature means and variances with empirical priors.
///
/// Every variance is widened by `var_smoothing` times the largest feature
/// variance, which keeps constant features from dividing by zero.
#[derive(Debug, Clone)]
pub struct GaussianNaiveBayes {
    pub var_smoothing: f64,
    /// Classes seen during fit, ascending
    classes: Vec<u8>,
    log_priors: Vec<f64>,
    means: Option<Array2<f64>>,
    variances: Option<Array2<f64>>,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self {
            var_smoothing: 1e-9,
            classes: Vec::new(),
            log_priors: Vec::new(),
            means: None,
            variances: None,
        }
    }
}

impl GaussianNaiveBayes {
    fn joint_log_likelihood(&self, row: ArrayView1<'_, f64>, k: usize) -> Option<f64> {
        let means = self.means.as_ref()?;
        let variances = self.variances.as_ref()?;

        let ll: f64 = row
            .iter()
            .zip(means.row(k).iter().zip(variances.row(k).iter()))
            .map(|(&x, (&mu, &var))| -0.5 * (2.0 * PI * var).ln() - 0.5 * (x - mu).powi(2) / var)
            .sum();
        Some(self.log_priors[k] + ll)
    }
}

impl Classifier for GaussianNaiveBayes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()> {
        let counts = check_fit_input(NAME, x, y, false)?;
        let (n, d) = x.dim();

        let epsilon = self.var_smoothing
            * x.var_axis(Axis(0), 0.0)
                .iter()
                .fold(0.0_f64, |m, &v| m.max(v));
        // All-constant input would leave zero variances behind
        let epsilon = if epsilon > 0.0 { epsilon } else { self.var_smoothing };

        let classes: Vec<u8> = (0..2u8).filter(|&c| counts[c as usize] > 0).collect();
        let mut means = Array2::<f64>::zeros((classes.len(), d));
        let mut variances = Array2::<f64>::zeros((classes.len(), d));
        let mut log_priors = Vec::with_capacity(classes.len());

        for (k, &class) in classes.iter().enumerate() {
            let rows: Vec<usize> = (0..n).filter(|&i| y[i] == class).collect();
            let subset = x.select(Axis(0), &rows);

            if let Some(mean) = subset.mean_axis(Axis(0)) {
                means.row_mut(k).assign(&mean);
            }
            variances
                .row_mut(k)
                .assign(&(subset.var_axis(Axis(0), 0.0) + epsilon));
            log_priors.push((rows.len() as f64 / n as f64).ln());
        }

        self.classes = classes;
        self.log_priors = log_priors;
        self.means = Some(means);
        self.variances = Some(variances);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<u8>> {
        check_predict_input(NAME, x, self.means.as_ref().map(|m| m.ncols()))?;

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mut best = (f64::NEG_INFINITY, self.classes[0]);
                for (k, &class) in self.classes.iter().enumerate() {
                    let score = self
                        .joint_log_likelihood(row, k)
                        .unwrap_or(f64::NEG_INFINITY);
                    if score > best.0 {
                        best = (score, class);
                    }
                }
                best.1
            })
            .collect())
    }
}
