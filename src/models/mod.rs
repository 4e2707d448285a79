//! Binary classifiers compared by the pipeline
//!
//! Every model implements [`Classifier`] over dense `f64` features and 0/1
//! labels. Logistic regression, the decision tree and the random forest
//! wrap `smartcore` estimators; the rest are implemented here.
//! [`ModelKind`] names the roster entries and builds fresh, unfitted
//! instances.

pub mod boosting;
mod dense;
pub mod extra_trees;
pub mod forest;
pub mod knn;
pub mod lda;
mod linalg;
pub mod logistic;
pub mod naive_bayes;
pub mod svm;
pub mod tree;

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

pub use boosting::GradientBoostingClassifier;
pub use extra_trees::ExtraTreesClassifier;
pub use forest::RandomForestClassifier;
pub use knn::NearestNeighborClassifier;
pub use lda::LinearDiscriminantAnalysis;
pub use logistic::LogisticRegression;
pub use naive_bayes::GaussianNaiveBayes;
pub use svm::LinearSvc;
pub use tree::DecisionTreeClassifier;

pub type ModelResult<T> = std::result::Result<T, PipelineError>;

/// A binary classifier with a fit/predict interface.
pub trait Classifier: Send {
    /// Name shown in reports
    fn name(&self) -> &'static str;

    /// Learn parameters from `x` (rows = samples) and 0/1 labels `y`.
    /// Refitting replaces all previously learned state.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()>;

    /// Predict a 0/1 label per row of `x`
    fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<u8>>;
}

/// Entries of the model roster
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    LogisticRegression,
    GaussianNb,
    LinearSvc,
    #[value(alias = "knn")]
    KNeighbors,
    #[value(alias = "lda")]
    LinearDiscriminant,
    RandomForest,
    ExtraTrees,
    #[value(alias = "xgb")]
    GradientBoosting,
    DecisionTree,
}

impl ModelKind {
    /// Evaluation order of a full run
    pub const ROSTER: [ModelKind; 9] = [
        ModelKind::LogisticRegression,
        ModelKind::GaussianNb,
        ModelKind::LinearSvc,
        ModelKind::KNeighbors,
        ModelKind::LinearDiscriminant,
        ModelKind::RandomForest,
        ModelKind::ExtraTrees,
        ModelKind::GradientBoosting,
        ModelKind::DecisionTree,
    ];

    /// Class name used in the results table
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "LogisticRegression",
            ModelKind::GaussianNb => "GaussianNB",
            ModelKind::LinearSvc => "LinearSVC",
            ModelKind::KNeighbors => "KNeighborsClassifier",
            ModelKind::LinearDiscriminant => "LinearDiscriminantAnalysis",
            ModelKind::RandomForest => "RandomForestClassifier",
            ModelKind::ExtraTrees => "ExtraTreesClassifier",
            ModelKind::GradientBoosting => "XGBClassifier",
            ModelKind::DecisionTree => "DecisionTreeClassifier",
        }
    }

    /// A fresh, unfitted model with default hyperparameters
    pub fn build(&self, seed: u64) -> Box<dyn Classifier> {
        match self {
            ModelKind::LogisticRegression => Box::new(LogisticRegression::default()),
            ModelKind::GaussianNb => Box::new(GaussianNaiveBayes::default()),
            ModelKind::LinearSvc => Box::new(LinearSvc::new(seed)),
            ModelKind::KNeighbors => Box::new(NearestNeighborClassifier::new(1)),
            ModelKind::LinearDiscriminant => Box::new(LinearDiscriminantAnalysis::default()),
            ModelKind::RandomForest => Box::new(RandomForestClassifier::new(seed)),
            ModelKind::ExtraTrees => Box::new(ExtraTreesClassifier::new(seed)),
            ModelKind::GradientBoosting => Box::new(GradientBoostingClassifier::default()),
            ModelKind::DecisionTree => Box::new(DecisionTreeClassifier::new(seed)),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Count of labels per class, `[negatives, positives]`
pub(crate) fn class_counts(y: ArrayView1<'_, u8>) -> [usize; 2] {
    let positives = y.iter().filter(|&&v| v == 1).count();
    [y.len() - positives, positives]
}

/// Shared argument checks for `fit`: non-empty, matching lengths, and
/// (when `need_both`) both classes present.
pub(crate) fn check_fit_input(
    model: &'static str,
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, u8>,
    need_both: bool,
) -> ModelResult<[usize; 2]> {
    if x.nrows() == 0 {
        return Err(PipelineError::EmptyTrainingSet { model });
    }
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: x.nrows(),
            found: y.len(),
        });
    }

    let counts = class_counts(y);
    if need_both {
        if counts[1] == 0 {
            return Err(PipelineError::SingleClass { model, class: 0 });
        }
        if counts[0] == 0 {
            return Err(PipelineError::SingleClass { model, class: 1 });
        }
    }
    Ok(counts)
}

/// Shared argument check for `predict`
pub(crate) fn check_predict_input(
    model: &'static str,
    x: ArrayView2<'_, f64>,
    n_features: Option<usize>,
) -> ModelResult<usize> {
    let expected = n_features.ok_or(PipelineError::NotFitted { model })?;
    if x.ncols() != expected {
        return Err(PipelineError::ShapeMismatch {
            expected,
            found: x.ncols(),
        });
    }
    Ok(expected)
}

#[cfg(test)]
pub(crate) mod test_data {
    use ndarray::{Array1, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Two noisy Gaussian-ish blobs; class 1 is shifted along every axis.
    pub fn blobs(n: usize, d: usize, shift: f64, seed: u64) -> (Array2<f64>, Array1<u8>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let y: Array1<u8> = (0..n).map(|i| (i % 2) as u8).collect();
        let x = Array2::from_shape_fn((n, d), |(r, _)| {
            let noise: f64 = rng.gen_range(-1.0..1.0);
            noise + if y[r] == 1 { shift } else { 0.0 }
        });
        (x, y)
    }

    pub fn accuracy(y: &Array1<u8>, pred: &Array1<u8>) -> f64 {
        let hits = y.iter().zip(pred.iter()).filter(|(a, b)| a == b).count();
        hits as f64 / y.len() as f64
    }
}
