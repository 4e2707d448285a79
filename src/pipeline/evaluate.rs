//! Fit one classifier on a prepared split and score it on the test rows

use std::time::Instant;

use anyhow::{Context, Result};
use ndarray::ArrayView1;
use serde::Serialize;
use smartcore::metrics::{accuracy, f1, recall};

use super::config::Target;
use super::split::SplitData;
use crate::error::PipelineError;
use crate::models::ModelKind;

/// Binary confusion counts with class 1 as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(
        y_true: ArrayView1<'_, u8>,
        y_pred: ArrayView1<'_, u8>,
    ) -> Result<Self, PipelineError> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: y_true.len(),
                found: y_pred.len(),
            });
        }

        let mut cm = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t == 1, p == 1) {
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (true, true) => cm.tp += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall, `2tp / (2tp + fp + fn)`
    pub fn f1(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }

    /// Rows `[tn, fp]` and `[fn, tp]`
    pub fn as_rows(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }
}

/// Zero denominators score 0
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Headline scores of one prediction vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    pub accuracy: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Scores {
    /// Accuracy, recall and F1 with class 1 as the positive class.
    ///
    /// `smartcore` scores the usual case. When the test rows hold a single
    /// class or no true positive is predicted, its recall and F1 are either
    /// NaN or not the binary scores, so the confusion counts are used and
    /// zero denominators score 0.
    pub fn compute(
        y_true: ArrayView1<'_, u8>,
        y_pred: ArrayView1<'_, u8>,
    ) -> Result<(Self, ConfusionMatrix), PipelineError> {
        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred)?;
        if confusion.total() == 0 {
            return Ok((Self { accuracy: 0.0, recall: 0.0, f1: 0.0 }, confusion));
        }

        let truth: Vec<f64> = y_true.iter().map(|&v| f64::from(v)).collect();
        let predicted: Vec<f64> = y_pred.iter().map(|&v| f64::from(v)).collect();
        let truth_labels: Vec<u8> = y_true.to_vec();
        let predicted_labels: Vec<u8> = y_pred.to_vec();

        let both_classes = confusion.tn + confusion.fp > 0 && confusion.tp + confusion.fn_ > 0;
        let scores = if both_classes && confusion.tp > 0 {
            Self {
                accuracy: accuracy(&truth_labels, &predicted_labels),
                recall: recall(&truth, &predicted),
                f1: f1(&truth, &predicted, 1.0),
            }
        } else {
            Self {
                accuracy: accuracy(&truth_labels, &predicted_labels),
                recall: confusion.recall(),
                f1: confusion.f1(),
            }
        };
        Ok((scores, confusion))
    }
}

/// Scores of one model on one target
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub model: ModelKind,
    pub model_name: &'static str,
    pub target: Target,
    pub accuracy: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
    pub fit_seconds: f64,
    pub predict_seconds: f64,
}

/// Build a fresh `kind` model, fit it on the training rows of `data` and
/// score its predictions on the test rows.
pub fn evaluate(kind: ModelKind, data: &SplitData, target: Target, seed: u64) -> Result<Evaluation> {
    let mut model = kind.build(seed);

    let start = Instant::now();
    model
        .fit(data.x_train.view(), data.y_train.view())
        .with_context(|| format!("Failed to fit {} on '{}'", kind, target.column()))?;
    let fit_seconds = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let predictions = model
        .predict(data.x_test.view())
        .with_context(|| format!("Failed to predict with {} on '{}'", kind, target.column()))?;
    let predict_seconds = start.elapsed().as_secs_f64();

    let (scores, confusion) = Scores::compute(data.y_test.view(), predictions.view())?;

    Ok(Evaluation {
        model: kind,
        model_name: model.name(),
        target,
        accuracy: scores.accuracy,
        recall: scores.recall,
        f1: scores.f1,
        confusion,
        fit_seconds,
        predict_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_counts_each_cell() {
        let y = array![0u8, 0, 1, 1, 1];
        let p = array![0u8, 1, 0, 1, 1];
        let cm = ConfusionMatrix::from_predictions(y.view(), p.view()).unwrap();

        assert_eq!(cm.as_rows(), [[1, 1], [1, 2]]);
        assert!((cm.accuracy() - 0.6).abs() < 1e-12);
        assert!((cm.recall() - 2.0 / 3.0).abs() < 1e-12);
        assert!((cm.f1() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_positives_scores_zero() {
        let y = array![0u8, 0, 0];
        let p = array![0u8, 0, 0];
        let cm = ConfusionMatrix::from_predictions(y.view(), p.view()).unwrap();

        assert_eq!(cm.accuracy(), 1.0);
        assert_eq!(cm.recall(), 0.0);
        assert_eq!(cm.f1(), 0.0);
    }

    #[test]
    fn test_scores_agree_with_confusion_counts() {
        let y = array![0u8, 0, 1, 1, 1, 0, 1, 0];
        let p = array![0u8, 1, 0, 1, 1, 0, 1, 1];
        let (scores, cm) = Scores::compute(y.view(), p.view()).unwrap();

        assert!((scores.accuracy - cm.accuracy()).abs() < 1e-12);
        assert!((scores.recall - 0.75).abs() < 1e-12);
        assert!((scores.f1 - cm.f1()).abs() < 1e-12);
    }

    #[test]
    fn test_scores_without_true_positives_are_zero() {
        let y = array![0u8, 1, 0, 1];
        let p = array![0u8, 0, 0, 0];
        let (scores, _) = Scores::compute(y.view(), p.view()).unwrap();

        assert_eq!(scores.accuracy, 0.5);
        assert_eq!(scores.recall, 0.0);
        assert_eq!(scores.f1, 0.0);
    }

    #[test]
    fn test_scores_on_single_class_test_rows() {
        let y = array![0u8, 0, 0, 0];
        let p = array![0u8, 1, 0, 0];
        let (scores, _) = Scores::compute(y.view(), p.view()).unwrap();

        assert_eq!(scores.accuracy, 0.75);
        assert_eq!(scores.recall, 0.0);
        assert_eq!(scores.f1, 0.0);
        assert!(scores.f1.is_finite());
    }

    #[test]
    fn test_length_mismatch() {
        let y = array![0u8, 1];
        let p = array![0u8];
        assert!(ConfusionMatrix::from_predictions(y.view(), p.view()).is_err());
    }
}
