//! Linear support vector classifier (squared hinge loss, dual coordinate
//! descent)

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{check_fit_input, check_predict_input, Classifier, ModelResult};
use crate::error::PipelineError;

const NAME: &str = "LinearSVC";

/// Minimizes `0.5 * |w|^2 + C * sum(max(0, 1 - y_i w.x_i)^2)` over the
/// features plus a constant bias feature (the bias is regularized too).
///
/// Each pass visits the dual variables in a seeded random order; the solver
/// stops when the projected-gradient spread of a pass drops below `tol`.
#[derive(Debug, Clone)]
pub struct LinearSvc {
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    /// Value of the constant feature that carries the intercept
    pub bias: f64,
    seed: u64,
    weights: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearSvc {
    pub fn new(seed: u64) -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            tol: 1e-4,
            bias: 1.0,
            seed,
            weights: None,
            intercept: 0.0,
        }
    }
}

impl Classifier for LinearSvc {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()> {
        check_fit_input(NAME, x, y, true)?;
        let (n, d) = x.dim();

        let signs: Vec<f64> = y.iter().map(|&v| if v == 1 { 1.0 } else { -1.0 }).collect();
        let diag = 0.5 / self.c;
        let q_diag: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| row.dot(&row) + self.bias * self.bias + diag)
            .collect();

        let mut alpha = vec![0.0; n];
        let mut w = Array1::<f64>::zeros(d);
        let mut w_bias = 0.0;
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);

        for _ in 0..self.max_iter {
            order.shuffle(&mut rng);

            let mut pg_max = f64::NEG_INFINITY;
            let mut pg_min = f64::INFINITY;

            for &i in &order {
                let row = x.row(i);
                let yi = signs[i];
                let g = yi * (row.dot(&w) + w_bias * self.bias) - 1.0 + diag * alpha[i];

                let pg = if alpha[i] == 0.0 { g.min(0.0) } else { g };
                pg_max = pg_max.max(pg);
                pg_min = pg_min.min(pg);

                if pg.abs() > 1e-12 {
                    let old = alpha[i];
                    alpha[i] = (old - g / q_diag[i]).max(0.0);
                    let delta = (alpha[i] - old) * yi;
                    w.scaled_add(delta, &row);
                    w_bias += delta * self.bias;
                }
            }

            if pg_max - pg_min <= self.tol {
                break;
            }
        }

        self.weights = Some(w);
        self.intercept = w_bias * self.bias;
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
