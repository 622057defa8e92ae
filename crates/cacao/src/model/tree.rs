//! Regression tree storage (SoA) and CART growth.
//!
//! Trees split on `x[feature] <= threshold` (left) versus `>` (right).
//! Missing values (`NaN`) compare false and therefore go right.

use ndarray::{ArrayView1, ArrayView2};
use rand::seq::index;
use rand::Rng;

/// Node index within a tree. The root is node 0.
pub type NodeId = u32;

const GAIN_EPS: f64 = 1e-12;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`RegressionTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node references itself as a child.
    SelfLoop { node: NodeId },
    /// A node was reached by more than one path.
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
}

// ============================================================================
// RegressionTree
// ============================================================================

/// Structure-of-Arrays regression tree.
///
/// All arrays are indexed by [`NodeId`]. Split fields of leaves and the
/// value of split nodes are unused (the value holds the node mean).
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    split_features: Box<[u32]>,
    thresholds: Box<[f64]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    is_leaf: Box<[bool]>,
    values: Box<[f64]>,
    n_samples: Box<[u32]>,
}

impl RegressionTree {
    /// A single-leaf tree predicting `value`.
    pub fn constant(value: f64) -> Self {
        let mut builder = TreeBuilder::default();
        let root = builder.add_node();
        builder.make_leaf(root, value, 0);
        builder.freeze()
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_feature(&self, node: NodeId) -> u32 {
        self.split_features[node as usize]
    }

    #[inline]
    pub fn threshold(&self, node: NodeId) -> f64 {
        self.thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    /// Mean target of the (bootstrap) samples that reached `node`.
    #[inline]
    pub fn value(&self, node: NodeId) -> f64 {
        self.values[node as usize]
    }

    /// Number of training samples that reached `node`.
    #[inline]
    pub fn node_samples(&self, node: NodeId) -> u32 {
        self.n_samples[node as usize]
    }

    /// Depth of the deepest leaf (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0 as NodeId, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }

    /// Traverse to the leaf reached by `sample` (one value per feature).
    #[inline]
    pub fn leaf_for(&self, sample: ArrayView1<'_, f64>) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let x = sample[self.split_feature(node) as usize];
            node = if x <= self.threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Predict a single sample.
    #[inline]
    pub fn predict_sample(&self, sample: ArrayView1<'_, f64>) -> f64 {
        self.value(self.leaf_for(sample))
    }

    /// Validate structural invariants: in-bounds children, no self loops,
    /// every node reachable exactly once from the root.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            if std::mem::replace(&mut visited[node as usize], true) {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            if self.is_leaf(node) {
                continue;
            }
            for (side, child) in [("left", self.left_child(node)), ("right", self.right_child(node))] {
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        match visited.iter().position(|&v| !v) {
            Some(node) => Err(TreeValidationError::UnreachableNode {
                node: node as NodeId,
            }),
            None => Ok(()),
        }
    }
}

// ============================================================================
// TreeBuilder
// ============================================================================

/// Mutable tree under construction.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    split_features: Vec<u32>,
    thresholds: Vec<f64>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    is_leaf: Vec<bool>,
    values: Vec<f64>,
    n_samples: Vec<u32>,
}

impl TreeBuilder {
    pub(crate) fn add_node(&mut self) -> NodeId {
        let id = self.is_leaf.len() as NodeId;
        self.split_features.push(0);
        self.thresholds.push(0.0);
        self.left_children.push(0);
        self.right_children.push(0);
        self.is_leaf.push(true);
        self.values.push(0.0);
        self.n_samples.push(0);
        id
    }

    pub(crate) fn make_leaf(&mut self, node: NodeId, value: f64, n_samples: usize) {
        let i = node as usize;
        self.is_leaf[i] = true;
        self.values[i] = value;
        self.n_samples[i] = n_samples as u32;
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn set_split(
        &mut self,
        node: NodeId,
        feature: usize,
        threshold: f64,
        left: NodeId,
        right: NodeId,
        value: f64,
        n_samples: usize,
    ) {
        let i = node as usize;
        self.is_leaf[i] = false;
        self.split_features[i] = feature as u32;
        self.thresholds[i] = threshold;
        self.left_children[i] = left;
        self.right_children[i] = right;
        self.values[i] = value;
        self.n_samples[i] = n_samples as u32;
    }

    pub(crate) fn freeze(self) -> RegressionTree {
        RegressionTree {
            split_features: self.split_features.into_boxed_slice(),
            thresholds: self.thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            values: self.values.into_boxed_slice(),
            n_samples: self.n_samples.into_boxed_slice(),
        }
    }
}

// ============================================================================
// CART growth
// ============================================================================

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowParams {
    pub max_depth: Option<u32>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per node (already resolved against `n_features`).
    pub max_features: usize,
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    /// `sum_l² / n_l + sum_r² / n_r`; larger means lower squared error.
    score: f64,
}

/// Grow a regression tree by recursive variance-reduction splitting.
///
/// `features` is feature-major `[n_features, n_samples]`. `samples` lists the
/// training rows (duplicates allowed, as produced by bootstrapping).
pub(crate) fn grow_tree<R: Rng + ?Sized>(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    mut samples: Vec<usize>,
    params: &GrowParams,
    rng: &mut R,
) -> RegressionTree {
    let n_features = features.nrows();
    let mut builder = TreeBuilder::default();
    let root = builder.add_node();
    let mut scratch: Vec<(f64, f64)> = Vec::with_capacity(samples.len());

    // (node, start, end, depth) over `samples`
    let mut stack = vec![(root, 0usize, samples.len(), 0u32)];
    while let Some((node, start, end, depth)) = stack.pop() {
        let node_samples = &mut samples[start..end];
        let n = node_samples.len();
        let (sum, sum_sq) = node_samples.iter().fold((0.0, 0.0), |(s, sq), &i| {
            let y = targets[i];
            (s + y, sq + y * y)
        });
        let mean = if n > 0 { sum / n as f64 } else { 0.0 };
        let sse = sum_sq - sum * mean;

        let splittable = n >= params.min_samples_split
            && n >= 2 * params.min_samples_leaf
            && params.max_depth.is_none_or(|d| depth < d)
            && sse > GAIN_EPS;
        let split = if splittable {
            let candidates = feature_candidates(n_features, params.max_features, rng);
            best_split(features, targets, node_samples, &candidates, sum, params.min_samples_leaf, &mut scratch)
        } else {
            None
        };

        match split {
            None => builder.make_leaf(node, mean, n),
            Some(split) => {
                let row = features.row(split.feature);
                let (left, right): (Vec<usize>, Vec<usize>) =
                    node_samples.iter().copied().partition(|&i| row[i] <= split.threshold);
                let mid = left.len();
                node_samples[..mid].copy_from_slice(&left);
                node_samples[mid..].copy_from_slice(&right);

                let l = builder.add_node();
                let r = builder.add_node();
                builder.set_split(node, split.feature, split.threshold, l, r, mean, n);
                stack.push((r, start + mid, end, depth + 1));
                stack.push((l, start, start + mid, depth + 1));
            }
        }
    }

    builder.freeze()
}

fn feature_candidates<R: Rng + ?Sized>(n_features: usize, max_features: usize, rng: &mut R) -> Vec<usize> {
    if max_features >= n_features {
        (0..n_features).collect()
    } else {
        let mut picked = index::sample(rng, n_features, max_features).into_vec();
        picked.sort_unstable();
        picked
    }
}

fn best_split(
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
    samples: &[usize],
    candidates: &[usize],
    total_sum: f64,
    min_samples_leaf: usize,
    scratch: &mut Vec<(f64, f64)>,
) -> Option<Split> {
    let n = samples.len();
    let parent_score = total_sum * total_sum / n as f64;
    let mut best: Option<Split> = None;

    for &feature in candidates {
        let row = features.row(feature);
        scratch.clear();
        scratch.extend(samples.iter().map(|&i| (row[i], targets[i])));
        scratch.sort_by(|a, b| a.0.total_cmp(&b.0));

        // constant feature at this node
        if scratch[0].0 == scratch[n - 1].0 {
            continue;
        }

        let mut left_sum = 0.0;
        for k in 0..n - 1 {
            left_sum += scratch[k].1;
            let n_left = k + 1;
            let n_right = n - n_left;
            if scratch[k].0 == scratch[k + 1].0 {
                continue;
            }
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }
            let right_sum = total_sum - left_sum;
            let score = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
            if score - parent_score <= GAIN_EPS {
                continue;
            }
            if best.is_none_or(|b| score > b.score) {
                let (lo, hi) = (scratch[k].0, scratch[k + 1].0);
                let mid = lo + (hi - lo) / 2.0;
                let threshold = if mid < hi { mid } else { lo };
                best = Some(Split {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn params(max_depth: Option<u32>) -> GrowParams {
        GrowParams {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }

    #[test]
    fn constant_tree_predicts_value() {
        let tree = RegressionTree::constant(3.25);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_sample(array![1.0, 2.0].view()), 3.25);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn step_function_is_learned_exactly() {
        // one feature, y = 1 if x > 2 else 0
        let x = array![[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let tree = grow_tree(x.view(), y.view(), (0..6).collect(), &params(None), &mut rng);

        assert!(tree.validate().is_ok());
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.split_feature(0), 0);
        assert_eq!(tree.threshold(0), 2.5);
        assert_eq!(tree.predict_sample(array![1.5].view()), 0.0);
        assert_eq!(tree.predict_sample(array![4.5].view()), 1.0);
    }

    #[test]
    fn max_depth_limits_growth() {
        let x = Array2::from_shape_fn((1, 32), |(_, j)| j as f64);
        let y = x.row(0).mapv(|v| v * v);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let tree = grow_tree(x.view(), y.view(), (0..32).collect(), &params(Some(3)), &mut rng);
        assert!(tree.depth() <= 3);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let x = array![[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]];
        let y = array![0.0, 10.0, 10.0, 10.0, 10.0, 10.0];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let grow = GrowParams {
            min_samples_leaf: 2,
            ..params(None)
        };
        let tree = grow_tree(x.view(), y.view(), (0..6).collect(), &grow, &mut rng);
        for node in 0..tree.n_nodes() as NodeId {
            if tree.is_leaf(node) {
                assert!(tree.node_samples(node) >= 2);
            }
        }
    }

    #[test]
    fn nan_goes_right() {
        let x = array![[0.0, 1.0, 2.0, 3.0]];
        let y = array![0.0, 0.0, 5.0, 5.0];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let tree = grow_tree(x.view(), y.view(), (0..4).collect(), &params(Some(1)), &mut rng);
        assert_eq!(tree.predict_sample(array![f64::NAN].view()), 5.0);
    }

    #[test]
    fn validate_detects_unreachable_node() {
        let mut builder = TreeBuilder::default();
        let root = builder.add_node();
        builder.make_leaf(root, 0.0, 1);
        let orphan = builder.add_node();
        builder.make_leaf(orphan, 1.0, 1);
        assert_eq!(
            builder.freeze().validate(),
            Err(TreeValidationError::UnreachableNode { node: 1 })
        );
    }
}
