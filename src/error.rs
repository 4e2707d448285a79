//! Error types for the preprocessing pipeline and classifiers.

use thiserror::Error;

/// Errors raised by the pipeline stages and the classifiers.
///
/// Stage functions return `anyhow::Result` and wrap these values, so callers
/// can still recover the variant with `downcast_ref::<PipelineError>()`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// A column required by a preprocessing step is absent from the table.
    #[error("step '{step}' requires column '{column}', which is not in the dataset")]
    MissingColumn { step: &'static str, column: String },

    /// An order timestamp could not be parsed.
    #[error("row {row}: cannot parse order timestamp {value:?}")]
    InvalidTimestamp { row: usize, value: String },

    /// A feature column is not numeric after preprocessing.
    #[error("feature column '{column}' has non-numeric type {dtype}")]
    NonNumericFeature { column: String, dtype: String },

    /// A feature or label column still contains nulls.
    #[error("column '{column}' contains {count} missing value(s)")]
    MissingValues { column: String, count: usize },

    /// A label column holds something other than 0/1.
    #[error("label column '{column}' must be binary 0/1, found {value}")]
    InvalidLabel { column: String, value: String },

    /// A value was not seen when the categorical encoder was fit.
    #[error("column '{column}': value {value:?} was not seen during encoder fit")]
    UnknownCategory { column: String, value: String },

    /// A code is outside the range produced by the encoder.
    #[error("column '{column}': code {code} is out of range (encoder has {classes} classes)")]
    UnknownCode {
        column: String,
        code: u32,
        classes: usize,
    },

    /// Split parameters cannot produce two non-empty partitions.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// Matrix dimensions do not line up.
    #[error("shape mismatch: expected {expected} columns, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// The training labels contain a single class but the model needs two.
    #[error("{model} needs samples of both classes, but only class {class} is present")]
    SingleClass { model: &'static str, class: u8 },

    /// No training rows were supplied.
    #[error("{model}: training set is empty")]
    EmptyTrainingSet { model: &'static str },

    /// The pooled covariance could not be inverted, even with the ridge.
    #[error("{model}: within-class covariance is singular")]
    SingularCovariance { model: &'static str },

    /// The underlying learning library rejected the data or parameters.
    #[error("{model}: {message}")]
    ModelFailed { model: &'static str, message: String },

    /// Predict was called before fit.
    #[error("{model} must be fitted before predicting")]
    NotFitted { model: &'static str },
}
