//! CART decision tree (Gini impurity) backed by smartcore

use ndarray::{Array1, ArrayView1, ArrayView2};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier as CartModel, DecisionTreeClassifierParameters,
};

use super::dense::{failed, to_dense, to_labels, Fitted};
use super::{check_fit_input, check_predict_input, Classifier, ModelResult};
use crate::error::PipelineError;

const NAME: &str = "DecisionTreeClassifier";

type Model = CartModel<f64, u32, DenseMatrix<f64>, Vec<u32>>;

pub struct DecisionTreeClassifier {
    /// `None` grows the tree until every leaf is pure
    pub max_depth: Option<u16>,
    seed: u64,
    fitted: Option<Fitted<Model>>,
    n_features: Option<usize>,
}

impl DecisionTreeClassifier {
    pub fn new(seed: u64) -> Self {
        Self {
            max_depth: None,
            seed,
            fitted: None,
            n_features: None,
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()> {
        let counts = check_fit_input(NAME, x, y, false)?;
        self.fitted = None;
        self.n_features = None;

        let fitted = match Fitted::constant(counts) {
            Some(constant) => constant,
            None => {
                let params = DecisionTreeClassifierParameters {
                    max_depth: self.max_depth,
                    seed: Some(self.seed),
                    ..Default::default()
                };
                let model = Model::fit(&to_dense(NAME, x)?, &to_labels(y), params)
                    .map_err(|e| failed(NAME, e))?;
                Fitted::Model(model)
            }
        };

        self.fitted = Some(fitted);
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<u8>> {
        check_predict_input(NAME, x, self.n_features)?;
        self.fitted
            .as_ref()
            .ok_or(PipelineError::NotFitted { model: NAME })?
            .predict(NAME, x, |model, dense| model.predict(dense))
    }
}
