//! Glue between ndarray views and smartcore's dense matrices

use ndarray::{Array1, ArrayView1, ArrayView2};
use smartcore::error::Failed;
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::ModelResult;
use crate::error::PipelineError;

/// Copy `x` row by row into a smartcore matrix
pub(crate) fn to_dense(model: &'static str, x: ArrayView2<'_, f64>) -> ModelResult<DenseMatrix<f64>> {
    let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|row| row.to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows).map_err(|e| failed(model, e))
}

pub(crate) fn to_labels(y: ArrayView1<'_, u8>) -> Vec<u32> {
    y.iter().map(|&v| u32::from(v)).collect()
}

pub(crate) fn from_labels(labels: Vec<u32>) -> Array1<u8> {
    labels.into_iter().map(|v| u8::from(v == 1)).collect()
}

pub(crate) fn failed(model: &'static str, err: Failed) -> PipelineError {
    PipelineError::ModelFailed {
        model,
        message: err.to_string(),
    }
}

/// Learned state of a smartcore-backed model. smartcore refuses to fit on a
/// single class, so that case is kept as a constant prediction.
pub(crate) enum Fitted<M> {
    Constant(u8),
    Model(M),
}

impl<M> Fitted<M> {
    /// `Constant` when `counts` (from `class_counts`) holds only one class
    pub(crate) fn constant(counts: [usize; 2]) -> Option<Self> {
        match counts {
            [_, 0] => Some(Fitted::Constant(0)),
            [0, _] => Some(Fitted::Constant(1)),
            _ => None,
        }
    }

    pub(crate) fn predict<F>(
        &self,
        model: &'static str,
        x: ArrayView2<'_, f64>,
        predict: F,
    ) -> ModelResult<Array1<u8>>
    where
        F: Fn(&M, &DenseMatrix<f64>) -> Result<Vec<u32>, Failed>,
    {
        match self {
            Fitted::Constant(class) => Ok(Array1::from_elem(x.nrows(), *class)),
            Fitted::Model(_) if x.nrows() == 0 => Ok(Array1::zeros(0)),
            Fitted::Model(m) => {
                let labels = predict(m, &to_dense(model, x)?).map_err(|e| failed(model, e))?;
                Ok(from_labels(labels))
            }
        }
    }
}
