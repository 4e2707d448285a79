//! Brute-force k-nearest-neighbour classifier

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;

use super::{check_fit_input, check_predict_input, Classifier, ModelResult};
use crate::error::PipelineError;

const NAME: &str = "KNeighborsClassifier";

/// Query rows handled per distance block
const QUERY_BLOCK: usize = 16;

/// Majority vote among the `k` closest training rows (Euclidean distance).
///
/// Distances are computed blockwise as `|t|^2 - 2 q.t`, dropping the
/// query norm, which is constant per query. Equal distances favour the lower
/// training index; a tied vote favours class 0.
#[derive(Debug, Clone)]
pub struct NearestNeighborClassifier {
    pub k: usize,
    train: Option<Array2<f64>>,
    train_sq_norms: Array1<f64>,
    labels: Array1<u8>,
}

impl NearestNeighborClassifier {
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            train: None,
            train_sq_norms: Array1::zeros(0),
            labels: Array1::zeros(0),
        }
    }

    fn vote(&self, distances: ArrayView1<'_, f64>) -> u8 {
        let mut nearest: Vec<(f64, usize)> = Vec::with_capacity(self.k + 1);
        for (j, &dist) in distances.iter().enumerate() {
            if nearest.len() < self.k || dist < nearest[nearest.len() - 1].0 {
                let pos = nearest.partition_point(|&(d, _)| d <= dist);
                nearest.insert(pos, (dist, j));
                nearest.truncate(self.k);
            }
        }

        let positives = nearest.iter().filter(|&&(_, j)| self.labels[j] == 1).count();
        u8::from(2 * positives > nearest.len())
    }
}

impl Classifier for NearestNeighborClassifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()> {
        check_fit_input(NAME, x, y, false)?;
        self.train_sq_norms = x.rows().into_iter().map(|r| r.dot(&r)).collect();
        self.train = Some(x.to_owned());
        self.labels = y.to_owned();
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<u8>> {
        let train = self
            .train
            .as_ref()
            .ok_or(PipelineError::NotFitted { model: NAME })?;
        check_predict_input(NAME, x, Some(train.ncols()))?;

        let starts: Vec<usize> = (0..x.nrows()).step_by(QUERY_BLOCK).collect();
        let blocks: Vec<Vec<u8>> = starts
            .par_iter()
            .map(|&start| {
                let end = (start + QUERY_BLOCK).min(x.nrows());
                let queries = x.slice(s![start..end, ..]);
                let dots = queries.dot(&train.t());

                dots.rows()
                    .into_iter()
                    .map(|row| {
                        let distances = &self.train_sq_norms - &(&row * 2.0);
                        self.vote(distances.view())
                    })
                    .collect()
            })
            .collect();

        Ok(blocks.into_iter().flatten().collect())
    }
}
