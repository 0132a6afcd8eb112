//! CART (Classification and Regression Tree) builder
//!
//! Implements deterministic exact-greedy classification tree construction.
//! Candidate thresholds are midpoints between consecutive distinct values
//! of a feature within the node; the split with the lowest weighted child
//! impurity wins.

use animal_tree_core::{Criterion, FeatureMatrix, Node};
use std::cmp::Ordering;

use crate::deterministic::{compare_impurity, midpoint, SplitTieBreaker};

/// Growth limits for a single tree
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    pub criterion: Criterion,
    /// `None` grows until leaves are pure or unsplittable
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            criterion: Criterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Split candidate with weighted child impurity and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    impurity: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, threshold: f64, impurity: f64) -> Self {
        Self {
            feature_idx,
            threshold,
            impurity,
            tie_breaker: SplitTieBreaker::new(feature_idx, threshold),
        }
    }

    fn beats(&self, current: &SplitCandidate) -> bool {
        match compare_impurity(self.impurity, current.impurity) {
            Ordering::Less => true,
            Ordering::Equal => self.tie_breaker < current.tie_breaker,
            Ordering::Greater => false,
        }
    }
}

/// Rows waiting to become a node, and where to link that node
struct PendingNode {
    indices: Vec<usize>,
    depth: usize,
    /// Parent node index and whether this is its left child
    parent: Option<(i32, bool)>,
}

/// Build a classification tree over encoded class indices
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a FeatureMatrix,
    labels: &'a [usize],
    n_classes: usize,
}

impl<'a> CartBuilder<'a> {
    /// `labels[i]` is the class index of row `i`, below `n_classes`
    pub fn new(
        features: &'a FeatureMatrix,
        labels: &'a [usize],
        n_classes: usize,
        config: TreeConfig,
    ) -> Self {
        assert_eq!(features.n_rows(), labels.len());

        Self {
            config,
            features,
            labels,
            n_classes,
        }
    }

    /// Build tree and return nodes in pre-order (node 0 is the root)
    ///
    /// Growth uses an explicit work stack rather than recursion, so an
    /// unconstrained tree may be as deep as the row count.
    pub fn build(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut pending = vec![PendingNode {
            indices: (0..self.labels.len()).collect(),
            depth: 0,
            parent: None,
        }];

        // Right child is pushed first so the left subtree is emitted first.
        while let Some(task) = pending.pop() {
            let current_idx = nodes.len() as i32;
            if let Some((parent, is_left)) = task.parent {
                let parent = &mut nodes[parent as usize];
                if is_left {
                    parent.left = current_idx;
                } else {
                    parent.right = current_idx;
                }
            }

            let (node, children) = self.build_node(&task.indices, task.depth, current_idx);
            nodes.push(node);

            if let Some((left_indices, right_indices)) = children {
                pending.push(PendingNode {
                    indices: right_indices,
                    depth: task.depth + 1,
                    parent: Some((current_idx, false)),
                });
                pending.push(PendingNode {
                    indices: left_indices,
                    depth: task.depth + 1,
                    parent: Some((current_idx, true)),
                });
            }
        }

        nodes
    }

    /// Decide one node; internal nodes also return their children's rows
    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        current_idx: i32,
    ) -> (Node, Option<(Vec<usize>, Vec<usize>)>) {
        let counts = self.class_counts(indices);
        let impurity = self.config.criterion.impurity(&counts);

        // Check stopping conditions
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if pure
            || depth_reached
            || indices.len() < self.config.min_samples_split
            || indices.len() < 2 * self.config.min_samples_leaf
        {
            return (Node::leaf(current_idx, impurity, counts), None);
        }

        let split = match self.find_best_split(indices) {
            Some(s) => s,
            // No feature varies inside this node
            None => return (Node::leaf(current_idx, impurity, counts), None),
        };

        let children = self.split_samples(indices, split.feature_idx, split.threshold);

        // Child links are patched in when the children are emitted
        let node = Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            impurity,
            counts,
        );
        (node, Some(children))
    }

    /// Find best split using a sorted sweep per feature
    ///
    /// A split is accepted even when it does not lower impurity, so rows
    /// with distinct features always end up separable.
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let parent_counts = self.class_counts(indices);
        let mut best_split: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature_idx in 0..self.features.n_features() {
            sorted.sort_by(|&a, &b| {
                self.value(a, feature_idx)
                    .total_cmp(&self.value(b, feature_idx))
                    .then(a.cmp(&b))
            });

            let mut left = vec![0usize; self.n_classes];
            let mut right = parent_counts.clone();

            for pos in 0..n - 1 {
                let label = self.labels[sorted[pos]];
                left[label] += 1;
                right[label] -= 1;

                let current = self.value(sorted[pos], feature_idx);
                let next = self.value(sorted[pos + 1], feature_idx);
                if current == next {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.config.min_samples_leaf || n_right < self.config.min_samples_leaf
                {
                    continue;
                }

                let weighted = (n_left as f64 * self.config.criterion.impurity(&left)
                    + n_right as f64 * self.config.criterion.impurity(&right))
                    / n as f64;

                let candidate = SplitCandidate::new(feature_idx, midpoint(current, next), weighted);

                best_split = match best_split {
                    None => Some(candidate),
                    Some(best) => {
                        // Deterministic tie-breaking
                        if candidate.beats(&best) {
                            Some(candidate)
                        } else {
                            Some(best)
                        }
                    }
                };
            }
        }

        best_split
    }

    /// Split samples based on threshold, preserving their order
    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .partition(|&&idx| self.value(idx, feature_idx) <= threshold)
    }

    /// Per-class sample counts for a set of rows
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &idx in indices {
            counts[self.labels[idx]] += 1;
        }
        counts
    }

    fn value(&self, row: usize, feature_idx: usize) -> f64 {
        self.features.get(row, feature_idx).unwrap_or(f64::NAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(columns: &[&str], rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix::from_rows(columns.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_simple_tree() {
        let features = matrix(&["legs"], vec![vec![2.0], vec![2.0], vec![4.0], vec![4.0]]);
        let labels = vec![0, 0, 1, 1];

        let builder = CartBuilder::new(&features, &labels, 2, TreeConfig::default());
        let nodes = builder.build();

        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].feature_idx, 0);
        assert_eq!(nodes[0].threshold, 3.0);
        assert_eq!(nodes[0].value, vec![2, 2]);
        assert!((nodes[0].impurity - 0.5).abs() < 1e-12);
        assert_eq!(nodes[1].value, vec![2, 0]);
        assert_eq!(nodes[2].value, vec![0, 2]);
    }

    #[test]
    fn test_leaf_only_tree() {
        let features = matrix(&["legs"], vec![vec![4.0]]);
        let labels = vec![0];

        let builder = CartBuilder::new(&features, &labels, 1, TreeConfig::default());
        let nodes = builder.build();

        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_leaf());
        assert_eq!(nodes[0].n_samples, 1);
    }

    #[test]
    fn test_xor_is_fully_separated() {
        // No single split lowers Gini at the root; growth must continue anyway.
        let features = matrix(
            &["a", "b"],
            vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
        );
        let labels = vec![0, 1, 1, 0];

        let nodes = CartBuilder::new(&features, &labels, 2, TreeConfig::default()).build();

        let leaves: Vec<&Node> = nodes.iter().filter(|n| n.is_leaf()).collect();
        assert_eq!(leaves.len(), 4);
        assert!(leaves.iter().all(|n| n.impurity == 0.0));
    }

    #[test]
    fn test_tie_prefers_lowest_feature() {
        // Both columns separate the classes equally well.
        let features = matrix(
            &["a", "b"],
            vec![vec![0.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 1.0]],
        );
        let labels = vec![0, 0, 1, 1];

        let nodes = CartBuilder::new(&features, &labels, 2, TreeConfig::default()).build();
        assert_eq!(nodes[0].feature_idx, 0);
        assert_eq!(nodes[0].threshold, 0.5);
    }

    #[test]
    fn test_contradictory_rows_stay_mixed() {
        let features = matrix(&["a"], vec![vec![1.0], vec![1.0]]);
        let labels = vec![0, 1];

        let nodes = CartBuilder::new(&features, &labels, 2, TreeConfig::default()).build();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].value, vec![1, 1]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let features = matrix(
            &["a", "b"],
            vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
        );
        let labels = vec![0, 1, 1, 0];
        let config = TreeConfig {
            max_depth: Some(1),
            ..TreeConfig::default()
        };

        let nodes = CartBuilder::new(&features, &labels, 2, config).build();
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_min_samples_leaf_blocks_small_children() {
        let features = matrix(&["a"], vec![vec![0.0], vec![1.0], vec![2.0]]);
        let labels = vec![0, 1, 1];
        let config = TreeConfig {
            min_samples_leaf: 2,
            ..TreeConfig::default()
        };

        let nodes = CartBuilder::new(&features, &labels, 2, config).build();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_entropy_criterion() {
        let features = matrix(&["legs"], vec![vec![2.0], vec![4.0]]);
        let labels = vec![0, 1];
        let config = TreeConfig {
            criterion: Criterion::Entropy,
            ..TreeConfig::default()
        };

        let nodes = CartBuilder::new(&features, &labels, 2, config).build();
        assert!((nodes[0].impurity - 1.0).abs() < 1e-12);
        assert_eq!(nodes.len(), 3);
    }

    #[test]
    fn test_deep_chain_does_not_exhaust_stack() {
        // An id column with alternating labels peels off about one row per split
        let n = 5_000;
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64]).collect();
        let features = matrix(&["id"], rows);
        let labels: Vec<usize> = (0..n).map(|i| i % 2).collect();

        let nodes = CartBuilder::new(&features, &labels, 2, TreeConfig::default()).build();

        assert_eq!(nodes.len(), 2 * n - 1);
        assert!(nodes.iter().filter(|node| node.is_leaf()).all(|node| node.impurity == 0.0));
        for node in nodes.iter().filter(|node| !node.is_leaf()) {
            assert!(node.left > node.id && node.right > node.id);
        }
    }
}
