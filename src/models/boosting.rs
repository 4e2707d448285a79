//! Gradient-boosted trees on the logistic loss (XGBoost-style exact greedy)

use ndarray::{Array1, ArrayView1, ArrayView2};
use rayon::prelude::*;

use super::{check_fit_input, check_predict_input, Classifier, ModelResult};

const NAME: &str = "XGBClassifier";

/// Gains at or below this are treated as no improvement
const MIN_GAIN: f64 = 1e-6;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        weight: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Default)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { weight } => return *weight,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => id = if row[*feature] < *threshold { *left } else { *right },
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    gain: f64,
    feature: usize,
    threshold: f64,
}

/// Running gradient statistics of one frontier node during a feature scan
#[derive(Debug, Clone, Copy, Default)]
struct ScanState {
    grad: f64,
    hess: f64,
    last: Option<f64>,
}

/// Additive ensemble of regression trees fitted to the gradient and hessian
/// of the log loss. Trees grow level by level; every frontier node is
/// split at the threshold with the largest structure-score gain.
#[derive(Debug, Clone)]
pub struct GradientBoostingClassifier {
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
    /// L2 penalty on leaf weights
    lambda: f64,
    min_child_weight: f64,
    base_score: f64,
    trees: Vec<RegressionTree>,
    n_features: Option<usize>,
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            lambda: 1.0,
            min_child_weight: 1.0,
            base_score: 0.5,
            trees: Vec::new(),
            n_features: None,
        }
    }
}

impl GradientBoostingClassifier {
    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    #[cfg(test)]
    fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn base_margin(&self) -> f64 {
        let p = self.base_score.clamp(1e-12, 1.0 - 1e-12);
        (p / (1.0 - p)).ln()
    }

    fn score(&self, grad: f64, hess: f64) -> f64 {
        grad * grad / (hess + self.lambda)
    }

    fn leaf_weight(&self, grad: f64, hess: f64) -> f64 {
        -grad / (hess + self.lambda) * self.learning_rate
    }

    /// Raw additive score per row (log-odds of class 1)
    pub fn decision_function(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<f64>> {
        check_predict_input(NAME, x, self.n_features)?;
        let base = self.base_margin();
        let margins: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                base + self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>()
            })
            .collect();
        Ok(Array1::from(margins))
    }

    /// Grow one tree. `node_of` holds each row's frontier node, or `None`
    /// once the row sits in a finished leaf.
    fn build_tree(
        &self,
        x: ArrayView2<'_, f64>,
        sorted: &[Vec<usize>],
        grad: &[f64],
        hess: &[f64],
        mut node_of: Vec<Option<usize>>,
    ) -> RegressionTree {
        let n_features = x.ncols();
        let mut nodes = vec![Node::Leaf { weight: 0.0 }];
        let mut frontier: Vec<usize> = vec![0];

        for depth in 0..=self.max_depth {
            if frontier.is_empty() {
                break;
            }

            // Frontier node id -> slot
            let mut slot_of = vec![usize::MAX; nodes.len()];
            for (slot, &id) in frontier.iter().enumerate() {
                slot_of[id] = slot;
            }

            let mut totals = vec![(0.0, 0.0); frontier.len()];
            for (i, node) in node_of.iter().enumerate() {
                if let Some(id) = node {
                    let t = &mut totals[slot_of[*id]];
                    t.0 += grad[i];
                    t.1 += hess[i];
                }
            }

            let best: Vec<Option<SplitCandidate>> = if depth == self.max_depth {
                vec![None; frontier.len()]
            } else {
                (0..n_features)
                    .into_par_iter()
                    .map(|f| self.scan_feature(x, f, &sorted[f], grad, hess, &node_of, &slot_of, &totals))
                    .reduce(
                        || vec![None; frontier.len()],
                        |a, b| {
                            a.into_iter()
                                .zip(b)
                                .map(|(a, b)| match (a, b) {
                                    (Some(a), Some(b)) => Some(better(a, b)),
                                    (a, None) => a,
                                    (None, b) => b,
                                })
                                .collect()
                        },
                    )
            };

            let mut next_frontier = Vec::new();
            let mut children: Vec<Option<(usize, usize)>> = vec![None; frontier.len()];
            for (slot, &id) in frontier.iter().enumerate() {
                let (g, h) = totals[slot];
                match best[slot] {
                    Some(split) => {
                        let left = nodes.len();
                        let right = left + 1;
                        nodes.push(Node::Leaf { weight: 0.0 });
                        nodes.push(Node::Leaf { weight: 0.0 });
                        nodes[id] = Node::Split {
                            feature: split.feature,
                            threshold: split.threshold,
                            left,
                            right,
                        };
                        children[slot] = Some((left, right));
                        next_frontier.extend([left, right]);
                    }
                    None => {
                        nodes[id] = Node::Leaf {
                            weight: self.leaf_weight(g, h),
                        };
                    }
                }
            }

            for (i, node) in node_of.iter_mut().enumerate() {
                let Some(id) = *node else { continue };
                *node = match (&nodes[id], children[slot_of[id]]) {
                    (
                        Node::Split {
                            feature, threshold, ..
                        },
                        Some((left, right)),
                    ) => Some(if x[[i, *feature]] < *threshold { left } else { right }),
                    _ => None,
                };
            }

            frontier = next_frontier;
        }

        RegressionTree { nodes }
    }

    /// Best split per frontier slot along one presorted feature
    #[allow(clippy::too_many_arguments)]
    fn scan_feature(
        &self,
        x: ArrayView2<'_, f64>,
        feature: usize,
        order: &[usize],
        grad: &[f64],
        hess: &[f64],
        node_of: &[Option<usize>],
        slot_of: &[usize],
        totals: &[(f64, f64)],
    ) -> Vec<Option<SplitCandidate>> {
        let mut states = vec![ScanState::default(); totals.len()];
        let mut best: Vec<Option<SplitCandidate>> = vec![None; totals.len()];

        for &i in order {
            let Some(id) = node_of[i] else { continue };
            let slot = slot_of[id];
            let value = x[[i, feature]];
            let state = &mut states[slot];

            if let Some(last) = state.last {
                if value > last {
                    let (g, h) = totals[slot];
                    let (gl, hl) = (state.grad, state.hess);
                    let (gr, hr) = (g - gl, h - hl);

                    if hl >= self.min_child_weight && hr >= self.min_child_weight {
                        let gain = 0.5
                            * (self.score(gl, hl) + self.score(gr, hr) - self.score(g, h));
                        if gain > MIN_GAIN && best[slot].map_or(true, |b| gain > b.gain) {
                            let mid = last / 2.0 + value / 2.0;
                            best[slot] = Some(SplitCandidate {
                                gain,
                                feature,
                                threshold: if mid > last { mid } else { value },
                            });
                        }
                    }
                }
            }

            state.grad += grad[i];
            state.hess += hess[i];
            state.last = Some(value);
        }

        best
    }
}

/// Higher gain wins; equal gains keep the lower feature index
fn better(a: SplitCandidate, b: SplitCandidate) -> SplitCandidate {
    if b.gain > a.gain || (b.gain == a.gain && b.feature < a.feature) {
        b
    } else {
        a
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for GradientBoostingClassifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, u8>) -> ModelResult<()> {
        check_fit_input(NAME, x, y, false)?;
        let (n, d) = x.dim();

        let sorted: Vec<Vec<usize>> = (0..d)
            .into_par_iter()
            .map(|f| {
                let column = x.column(f);
                let mut order: Vec<usize> = (0..n).collect();
                order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
                order
            })
            .collect();

        let mut margins = vec![self.base_margin(); n];
        let mut grad = vec![0.0; n];
        let mut hess = vec![0.0; n];
        self.trees.clear();

        for _ in 0..self.n_estimators {
            for i in 0..n {
                let p = sigmoid(margins[i]);
                grad[i] = p - f64::from(y[i]);
                hess[i] = (p * (1.0 - p)).max(1e-16);
            }

            let tree = self.build_tree(x, &sorted, &grad, &hess, vec![Some(0); n]);
            for (i, margin) in margins.iter_mut().enumerate() {
                *margin += tree.predict_row(x.row(i));
            }
            self.trees.push(tree);
        }

        self.n_features = Some(d);
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ModelResult<Array1<u8>> {
        Ok(self.decision_function(x)?.mapv(|z| u8::from(z > 0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_data::{accuracy, blobs};
    use ndarray::{array, Array2};

    #[test]
    fn test_separates_shifted_blobs() {
        let (x, y) = blobs(300, 3, 1.5, 23);
        let mut model = GradientBoostingClassifier::default().with_estimators(20);
        model.fit(x.view(), y.view()).unwrap();

        assert_eq!(model.n_trees(), 20);
        assert!(accuracy(&y, &model.predict(x.view()).unwrap()) > 0.95);
    }

    #[test]
    fn test_learns_interaction() {
        // Positive only when both features are positive
        let x = Array2::from_shape_fn((200, 2), |(i, j)| {
            let v = (i % 10) as f64 + 1.0;
            if ((i / 10) >> j) & 1 == 0 { v } else { -v }
        });
        let y: Array1<u8> = x
            .rows()
            .into_iter()
            .map(|r| u8::from(r[0] > 0.0 && r[1] > 0.0))
            .collect();

        let mut model = GradientBoostingClassifier::default().with_estimators(30);
        model.fit(x.view(), y.view()).unwrap();
        assert_eq!(accuracy(&y, &model.predict(x.view()).unwrap()), 1.0);
    }

    #[test]
    fn test_zero_rounds_uses_base_score() {
        let x = array![[0.0], [1.0]];
        let y = array![0u8, 1];
        let mut model = GradientBoostingClassifier::default().with_estimators(0);
        model.fit(x.view(), y.view()).unwrap();

        let margins = model.decision_function(x.view()).unwrap();
        assert!(margins.iter().all(|m| m.abs() < 1e-12));
    }

    #[test]
    fn test_refits_are_identical() {
        let (x, y) = blobs(120, 3, 0.8, 31);
        let mut a = GradientBoostingClassifier::default().with_estimators(10);
        let mut b = GradientBoostingClassifier::default().with_estimators(10);
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();

        assert_eq!(
            a.decision_function(x.view()).unwrap(),
            b.decision_function(x.view()).unwrap()
        );
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = GradientBoostingClassifier::default();
        assert!(model.predict(array![[1.0]].view()).is_err());
    }
}
