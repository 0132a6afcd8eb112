//! Decision tree classifier backed by the CART builder

use animal_tree_core::{
    unique_classes, Classifier, CoreError, DecisionTree, FeatureMatrix, Result,
};
use tracing::info;

use crate::cart::{CartBuilder, TreeConfig};

/// Single-tree CART classifier
#[derive(Clone, Debug, Default)]
pub struct CartClassifier {
    config: TreeConfig,
}

impl CartClassifier {
    pub fn new(config: TreeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }
}

impl Classifier for CartClassifier {
    type Model = DecisionTree;

    /// Fit a fully deterministic tree on the given rows
    fn fit(&self, features: &FeatureMatrix, target: &[String]) -> Result<DecisionTree> {
        if features.is_empty() || target.is_empty() {
            return Err(CoreError::EmptyDataset);
        }
        if features.n_rows() != target.len() {
            return Err(CoreError::ShapeMismatch {
                expected: features.n_rows(),
                actual: target.len(),
            });
        }
        features.ensure_finite()?;

        let classes = unique_classes(target);
        let labels = target
            .iter()
            .map(|label| {
                classes
                    .binary_search(label)
                    .map_err(|_| CoreError::UnknownClass(label.clone()))
            })
            .collect::<Result<Vec<usize>>>()?;

        info!(
            "Fitting {} tree on {} rows, {} features, {} classes",
            self.config.criterion,
            features.n_rows(),
            features.n_features(),
            classes.len()
        );

        let builder = CartBuilder::new(features, &labels, classes.len(), self.config.clone());
        let nodes = builder.build();

        let tree = DecisionTree::new(
            nodes,
            classes,
            features.column_names().to_vec(),
            self.config.criterion,
        );
        tree.validate()?;

        info!(
            "Tree fitted: {} nodes, {} leaves, depth {}",
            tree.node_count(),
            tree.n_leaves(),
            tree.depth()
        );

        Ok(tree)
    }

    fn predict(&self, model: &DecisionTree, features: &FeatureMatrix) -> Result<Vec<String>> {
        model.predict(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_simple_dataset() -> (FeatureMatrix, Vec<String>) {
        let x = FeatureMatrix::from_rows(
            labels(&["legs", "covering_feathers", "covering_fur"]),
            vec![
                vec![4.0, 0.0, 1.0],
                vec![2.0, 1.0, 0.0],
                vec![0.0, 0.0, 0.0],
                vec![4.0, 0.0, 1.0],
            ],
        )
        .unwrap();
        (x, labels(&["mammal", "bird", "fish", "mammal"]))
    }

    #[test]
    fn test_fit_memorizes_training_rows() -> anyhow::Result<()> {
        let (x, y) = create_simple_dataset();
        let clf = CartClassifier::default();

        let model = clf.fit(&x, &y)?;
        assert_eq!(model.classes, labels(&["bird", "fish", "mammal"]));
        assert_eq!(clf.predict(&model, &x)?, y);

        Ok(())
    }

    #[test]
    fn test_empty_dataset() {
        let x = FeatureMatrix::new(labels(&["legs"]));
        let err = CartClassifier::default().fit(&x, &[]).unwrap_err();
        assert_eq!(err, CoreError::EmptyDataset);
    }

    #[test]
    fn test_shape_mismatch() {
        let (x, _) = create_simple_dataset();
        let err = CartClassifier::default()
            .fit(&x, &labels(&["mammal"]))
            .unwrap_err();
        assert!(matches!(err, CoreError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_nan_feature_is_type_mismatch() {
        let x = FeatureMatrix::from_rows(labels(&["weight"]), vec![vec![1.0], vec![f64::NAN]])
            .unwrap();
        let err = CartClassifier::default()
            .fit(&x, &labels(&["a", "b"]))
            .unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));
    }

    #[test]
    fn test_determinism() -> anyhow::Result<()> {
        let (x, y) = create_simple_dataset();
        let model1 = CartClassifier::default().fit(&x, &y)?;
        let model2 = CartClassifier::default().fit(&x, &y)?;
        assert_eq!(model1, model2);
        Ok(())
    }

    #[test]
    fn test_zero_feature_columns_give_single_leaf() -> anyhow::Result<()> {
        let x = FeatureMatrix::from_columns(3, Vec::new())?;
        let y = labels(&["a", "b", "b"]);

        let model = CartClassifier::default().fit(&x, &y)?;
        assert_eq!(model.node_count(), 1);
        assert_eq!(model.predict(&x)?, labels(&["b", "b", "b"]));
        Ok(())
    }
}
