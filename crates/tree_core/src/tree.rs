//! Classification tree structures
//!
//! Nodes live in a flat vector with node 0 as the root. Internal nodes send
//! a sample left when `feature <= threshold`. Every node, internal or leaf,
//! carries the class distribution of the training samples that reached it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CoreError, Result};
use crate::matrix::FeatureMatrix;

/// Impurity measure used to score candidate splits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    #[default]
    Gini,
    Entropy,
}

impl Criterion {
    /// Impurity of a class-count vector
    pub fn impurity(&self, counts: &[usize]) -> f64 {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;

        match self {
            Criterion::Gini => {
                let sum_sq: f64 = counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / total;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            Criterion::Entropy => counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / total;
                    -p * p.log2()
                })
                .sum(),
        }
    }

    /// Short label used in reports and figures
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Gini => "gini",
            Criterion::Entropy => "entropy",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0` and `left`/`right` index into the
/// node vector. Leaves use `-1` for all three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node ID (position in the node vector)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Split threshold; unused on leaves
    pub threshold: f64,

    /// Impurity of the samples at this node
    pub impurity: f64,

    /// Number of training samples that reached this node
    pub n_samples: usize,

    /// Per-class sample counts, aligned with `DecisionTree::classes`
    pub value: Vec<usize>,
}

impl Node {
    /// Create a new internal (split) node; children are patched in later
    pub fn internal(
        id: i32,
        feature_idx: i32,
        threshold: f64,
        impurity: f64,
        value: Vec<usize>,
    ) -> Self {
        let n_samples = value.iter().sum();
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx,
            threshold,
            impurity,
            n_samples,
            value,
        }
    }

    /// Create a new leaf node
    pub fn leaf(id: i32, impurity: f64, value: Vec<usize>) -> Self {
        let n_samples = value.iter().sum();
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            impurity,
            n_samples,
            value,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx < 0
    }

    /// Index of the majority class; ties go to the lowest index
    pub fn predicted_class(&self) -> usize {
        let mut best = 0;
        for (idx, &count) in self.value.iter().enumerate() {
            if count > self.value[best] {
                best = idx;
            }
        }
        best
    }

    /// Share of samples in the majority class
    pub fn purity(&self) -> f64 {
        if self.n_samples == 0 {
            return 0.0;
        }
        self.value[self.predicted_class()] as f64 / self.n_samples as f64
    }
}

/// A fitted classification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,

    /// Sorted, distinct class labels
    pub classes: Vec<String>,

    /// Feature names the tree was fitted on
    pub feature_names: Vec<String>,

    /// Criterion used during fitting
    pub criterion: Criterion,
}

impl DecisionTree {
    pub fn new(
        nodes: Vec<Node>,
        classes: Vec<String>,
        feature_names: Vec<String>,
        criterion: Criterion,
    ) -> Self {
        Self {
            nodes,
            classes,
            feature_names,
            criterion,
        }
    }

    /// Get the root node
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Depth of the deepest leaf (a single-leaf tree has depth 0)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = if self.nodes.is_empty() { vec![] } else { vec![(0usize, 0usize)] };
        while let Some((idx, depth)) = stack.pop() {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                deepest = deepest.max(depth);
            } else {
                stack.push((node.left as usize, depth + 1));
                stack.push((node.right as usize, depth + 1));
            }
        }
        deepest
    }

    /// Check that child links and feature indices are in range
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(CoreError::InvalidTree("tree has no nodes".to_string()));
        }

        let n = self.nodes.len() as i32;
        for node in &self.nodes {
            if node.value.len() != self.classes.len() {
                return Err(CoreError::InvalidTree(format!(
                    "node {} has {} class counts for {} classes",
                    node.id,
                    node.value.len(),
                    self.classes.len()
                )));
            }
            if node.is_leaf() {
                continue;
            }
            if node.feature_idx as usize >= self.feature_names.len() {
                return Err(CoreError::InvalidTree(format!(
                    "node {} splits on unknown feature {}",
                    node.id, node.feature_idx
                )));
            }
            for child in [node.left, node.right] {
                if child <= node.id || child >= n {
                    return Err(CoreError::InvalidTree(format!(
                        "node {} has dangling child {}",
                        node.id, child
                    )));
                }
            }
        }
        Ok(())
    }

    /// Walk the tree for one row and return the leaf it lands in
    pub fn leaf_for(&self, features: &[f64]) -> Result<&Node> {
        if features.len() != self.feature_names.len() {
            return Err(CoreError::ShapeMismatch {
                expected: self.feature_names.len(),
                actual: features.len(),
            });
        }

        let mut idx = 0usize;
        loop {
            let node = self.nodes.get(idx).ok_or_else(|| {
                CoreError::InvalidTree(format!("node index {} out of range", idx))
            })?;

            if node.is_leaf() {
                return Ok(node);
            }

            let next = if features[node.feature_idx as usize] <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return Err(CoreError::InvalidTree(format!(
                    "internal node {} has no child",
                    node.id
                )));
            }
            idx = next as usize;
        }
    }

    /// Predict the class index for one row
    pub fn predict_index(&self, features: &[f64]) -> Result<usize> {
        Ok(self.leaf_for(features)?.predicted_class())
    }

    /// Predict class labels for every row, in row order
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<String>> {
        features
            .rows()
            .map(|row| {
                let class = self.predict_index(row)?;
                Ok(self.classes[class].clone())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// legs <= 3 ? bird : mammal
    fn stump() -> DecisionTree {
        let mut root = Node::internal(0, 0, 3.0, 0.5, vec![2, 2]);
        root.left = 1;
        root.right = 2;
        DecisionTree::new(
            vec![
                root,
                Node::leaf(1, 0.0, vec![2, 0]),
                Node::leaf(2, 0.0, vec![0, 2]),
            ],
            vec!["bird".to_string(), "mammal".to_string()],
            vec!["legs".to_string()],
            Criterion::Gini,
        )
    }

    #[test]
    fn gini_impurity() {
        assert_eq!(Criterion::Gini.impurity(&[4, 0]), 0.0);
        assert!((Criterion::Gini.impurity(&[2, 2]) - 0.5).abs() < 1e-12);
        assert_eq!(Criterion::Gini.impurity(&[]), 0.0);
    }

    #[test]
    fn entropy_impurity() {
        assert_eq!(Criterion::Entropy.impurity(&[3, 0]), 0.0);
        assert!((Criterion::Entropy.impurity(&[1, 1]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn predicted_class_breaks_ties_low() {
        let node = Node::leaf(0, 0.5, vec![1, 1]);
        assert_eq!(node.predicted_class(), 0);
        assert_eq!(node.purity(), 0.5);
    }

    #[test]
    fn predict_follows_threshold() {
        let tree = stump();
        let x = FeatureMatrix::from_rows(
            vec!["legs".to_string()],
            vec![vec![2.0], vec![3.0], vec![4.0]],
        )
        .unwrap();

        let labels = tree.predict(&x).unwrap();
        assert_eq!(labels, vec!["bird", "bird", "mammal"]);
    }

    #[test]
    fn predict_rejects_wrong_width() {
        let tree = stump();
        assert!(matches!(
            tree.predict_index(&[1.0, 2.0]),
            Err(CoreError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn structure_queries() {
        let tree = stump();
        assert!(tree.validate().is_ok());
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn validate_catches_dangling_child() {
        let mut tree = stump();
        tree.nodes[0].right = 7;
        assert!(matches!(tree.validate(), Err(CoreError::InvalidTree(_))));
    }

    #[test]
    fn depth_of_long_chain() {
        // Each split sends one row left and the rest right
        let splits = 50_000;
        let mut nodes = Vec::with_capacity(2 * splits + 1);
        for i in 0..splits {
            let id = nodes.len() as i32;
            let mut split = Node::internal(id, 0, i as f64 + 0.5, 0.5, vec![1, 1]);
            split.left = id + 1;
            split.right = id + 2;
            nodes.push(split);
            nodes.push(Node::leaf(id + 1, 0.0, vec![1, 0]));
        }
        let last = nodes.len() as i32;
        nodes.push(Node::leaf(last, 0.0, vec![0, 1]));
        let tree = DecisionTree::new(
            nodes,
            vec!["bird".to_string(), "mammal".to_string()],
            vec!["id".to_string()],
            Criterion::Gini,
        );

        assert!(tree.validate().is_ok());
        assert_eq!(tree.depth(), splits);
        assert_eq!(tree.n_leaves(), splits + 1);
        assert_eq!(tree.predict_index(&[1e9]).unwrap(), 1);
    }
}
