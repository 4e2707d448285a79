//! Random forest backed by smartcore: bootstrap rows, `sqrt(d)` features
//! per split, majority vote

use ndarray::{Array1, ArrayView1, ArrayView2};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier as ForestModel, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::dense::{failed, to_dense, to_labels, Fitted};
use super::{check_fit_input, check_predict_input, Classifier, ModelResult};
use crate::error::PipelineError;

const NAME: &str = "RandomForestClassifier";

type Model = ForestModel<f64, u32, DenseMatrix<f64>, Vec<u32>>;

pub struct RandomForestClassifier {
    pub n_trees: u16,
    seed: u64,
    fitted: Option<Fitted<Model>>,
    n_features: Option<usize>,
}

impl RandomForestClassifier {
    /// 100 fully grown trees
    pub fn new(seed: u64) -> Self {
        Self {
            n_trees: 100,
            seed,
            fitted: None,
            n_features: None,
        }
    }

    pub fn with_trees(mut self, n_trees: u16) -> Self {
        self.n_trees = n_trees.max(1);
        self
    }
}

impl Classifier for RandomForestClassifier {
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
                let params = RandomForestClassifierParameters {
                    n_trees: self.n_trees,
                    seed: self.seed,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};

    #[test]
    fn test_separates_blobs() {
        let (x, y) = blobs(200, 4, 1.5, 13);
        let mut model = RandomForestClassifier::new(42).with_trees(20);
        model.fit(x.view(), y.view()).unwrap();
        assert!(accuracy(&y, &model.predict(x.view()).unwrap()) > 0.95);
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let (x, y) = blobs(150, 3, 0.6, 19);
        let (unseen, _) = blobs(60, 3, 0.6, 99);

        let mut a = RandomForestClassifier::new(7).with_trees(15);
        let mut b = RandomForestClassifier::new(7).with_trees(15);
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();

        assert_eq!(
            a.predict(unseen.view()).unwrap(),
            b.predict(unseen.view()).unwrap()
        );
    }

    #[test]
    fn test_single_class_predicts_constant() {
        let (x, _) = blobs(30, 2, 1.0, 3);
        let y = Array1::<u8>::ones(30);
        let mut model = RandomForestClassifier::new(0).with_trees(5);
        model.fit(x.view(), y.view()).unwrap();
        assert_eq!(model.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let (x, _) = blobs(4, 2, 1.0, 1);
        let model = RandomForestClassifier::new(0);
        assert!(matches!(
            model.predict(x.view()),
            Err(PipelineError::NotFitted { .. })
        ));
    }
}
