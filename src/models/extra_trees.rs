//! Extremely randomized trees
//!
//! Each tree sees the full training set; a split draws one threshold per
//! candidate feature uniformly between the node minimum and maximum and
//! keeps the candidate with the lowest Gini impurity. Nodes live in a flat
//! vector and are built with an explicit stack, so unlimited depth cannot
//! overflow the call stack.

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::{check_fit_input, check_predict_input, Classifier, ModelResult};
use crate::error::PipelineError;

const NAME: &str = "ExtraTreesClassifier";

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        positive_rate: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature: usize,
    threshold: f64,
    /// Sum over children of `n_child * gini_child`
    impurity: f64,
}

/// `n * gini` for a node with `pos` positives out of `n`
fn weighted_gini(pos: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let (p, q) = (pos as f64, (n - pos) as f64);
    n as f64 - (p * p + q * q) / n as f64
}

/// One fully grown tree examining `sqrt(d)` non-constant features per split
#[derive(Debug, Clone, Default)]
struct RandomizedTree {
    nodes: Vec<Node>,
}

impl RandomizedTree {
    fn grow(x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>, rng: &mut StdRng) -> Self {
        let n_features = x.ncols();
        let max_features = ((n_features as f64).sqrt() as usize).max(1);
        let mut features: Vec<usize> = (0..n_features).collect();

        let mut nodes = vec![Node::Leaf { positive_rate: 0.0 }];
        let mut stack: Vec<(usize, Vec<usize>)> = vec![(0, (0..x.nrows()).collect())];

        while let Some((node_id, samples)) = stack.pop() {
            let n = samples.len();
            let pos = samples.iter().filter(|&&i| y[i] == 1).count();
            let positive_rate = if n == 0 { 0.0 } else { pos as f64 / n as f64 };

            let candidate = if n >= 2 && pos > 0 && pos < n {
                features.shuffle(rng);
                find_split(x, y, &samples, pos, &features, max_features, rng)
            } else {
                None
            };

            let Some(candidate) = candidate else {
                nodes[node_id] = Node::Leaf { positive_rate };
                continue;
            };

            let (left, right): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&i| x[[i, candidate.feature]] <= candidate.threshold);

            let left_id = nodes.len();
            let right_id = left_id + 1;
            nodes.push(Node::Leaf { positive_rate: 0.0 });
            nodes.push(Node::Leaf { positive_rate: 0.0 });
            nodes[node_id] = Node::Split {
                feature: candidate.feature,
                threshold: candidate.threshold,
                left: left_id,
                right: right_id,
            };

            stack.push((right_id, right));
            stack.push((left_id, left));
        }

        Self { nodes }
    }

    /// Fraction of positive training samples in the leaf reached by `row`
    fn positive_rate(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { positive_rate } => return *positive_rate,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Best random-threshold candidate among the first `max_features`
/// non-constant features of `features`. Constant features do not count.
fn find_split(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, u8>,
    samples: &[usize],
    pos: usize,
    features: &[usize],
    max_features: usize,
    rng: &mut StdRng,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    let mut visited = 0;

    for &feature in features {
        if visited >= max_features {
            break;
        }
        let Some(candidate) = random_threshold(x, y, samples, pos, feature, rng) else {
            continue;
        };
        visited += 1;

        if best.map_or(true, |b| candidate.impurity < b.impurity) {
            best = Some(candidate);
        }
    }
    best
}

fn random_threshold(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, u8>,
    samples: &[usize],
    pos: usize,
    feature: usize,
    rng: &mut StdRng,
) -> Option<Candidate> {
    let (min, max) = samples
        .iter()
        .map(|&i| x[[i, feature]])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min >= max {
        return None;
    }

    let threshold = rng.gen_range(min..max);
    let (mut left_n, mut left_pos) = (0, 0);
    for &i in samples {
        if x[[i, feature]] <= threshold {
            left_n += 1;
            left_pos += y[i] as usize;
        }
    }

    let n = samples.len();
    Some(Candidate {
        feature,
        threshold,
        impurity: weighted_gini(left_pos, left_n) + weighted_gini(pos - left_pos, n - left_n),
    })
}

/// Averages the leaf positive rates of independently grown trees.
///
/// Per-tree seeds are drawn up front from one master generator, so the
/// result does not depend on how rayon schedules the trees.
#[derive(Debug, Clone)]
pub struct ExtraTreesClassifier {
    pub n_estimators: usize,
    seed: u64,
    trees: Vec<RandomizedTree>,
    n_features: Option<usize>,
}

impl ExtraTreesClassifier {
    /// 100 trees
    pub fn new(seed: u64) -> Self {
        Self {
            n_estimators: 100,
            seed,
            trees: Vec::new(),
            n_features: None,
        }
    }

    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators.max(1);
        self
    }
}

impl Classifier for ExtraTreesClassifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()> {
        check_fit_input(NAME, x, y, false)?;

        let mut master = StdRng::seed_from_u64(self.seed);
        let seeds: Vec<u64> = (0..self.n_estimators).map(|_| master.gen()).collect();

        self.trees = seeds
            .into_par_iter()
            .map(|seed| RandomizedTree::grow(x, y, &mut StdRng::seed_from_u64(seed)))
            .collect();
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<u8>> {
        check_predict_input(NAME, x, self.n_features)?;
        if self.trees.is_empty() {
            return Err(PipelineError::NotFitted { model: NAME });
        }

        let n_trees = self.trees.len() as f64;
        let votes: Vec<u8> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let mean: f64 =
                    self.trees.iter().map(|t| t.positive_rate(row)).sum::<f64>() / n_trees;
                u8::from(mean > 0.5)
            })
            .collect();
        Ok(Array1::from(votes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};
    use ndarray::array;

    #[test]
    fn test_separates_blobs() {
        let (x, y) = blobs(200, 4, 1.5, 17);
        let mut model = ExtraTreesClassifier::new(42).with_estimators(20);
        model.fit(x.view(), y.view()).unwrap();

        assert_eq!(model.trees.len(), 20);
        assert!(accuracy(&y, &model.predict(x.view()).unwrap()) > 0.95);
    }

    #[test]
    fn test_single_tree_fits_training_data() {
        let (x, y) = blobs(200, 2, 3.0, 2);
        let tree = RandomizedTree::grow(x.view(), y.view(), &mut StdRng::seed_from_u64(5));
        let pred: Array1<u8> = x
            .rows()
            .into_iter()
            .map(|row| u8::from(tree.positive_rate(row) > 0.5))
            .collect();
        assert_eq!(accuracy(&y, &pred), 1.0);
    }

    #[test]
    fn test_pure_labels_give_single_leaf() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let y = array![1u8, 1];
        let tree = RandomizedTree::grow(x.view(), y.view(), &mut StdRng::seed_from_u64(0));
        assert_eq!(tree.nodes.len(), 1);
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let (x, y) = blobs(150, 3, 0.6, 19);
        let (unseen, _) = blobs(60, 3, 0.6, 99);

        let mut a = ExtraTreesClassifier::new(7).with_estimators(15);
        let mut b = ExtraTreesClassifier::new(7).with_estimators(15);
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();

        assert_eq!(
            a.predict(unseen.view()).unwrap(),
            b.predict(unseen.view()).unwrap()
        );
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let (x, _) = blobs(4, 2, 1.0, 1);
        let model = ExtraTreesClassifier::new(0);
        assert!(matches!(
            model.predict(x.view()),
            Err(PipelineError::NotFitted { .. })
        ));
    }
}
