//! Animal Tree core types
//!
//! Shared model types for the tree trainer: the numeric feature matrix,
//! the fitted classification tree and the backend-neutral classifier
//! interface.
//!
//! Modules:
//! - `matrix`: Dense named feature matrix
//! - `tree`: Tree nodes, impurity criteria and prediction
//! - `classifier`: `Classifier` fit/predict interface
//! - `errors`: Core error type

pub mod classifier;
pub mod errors;
pub mod matrix;
pub mod tree;

pub use classifier::Classifier;
pub use errors::{CoreError, Result};
pub use matrix::FeatureMatrix;
pub use tree::{Criterion, DecisionTree, Node};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sorted, de-duplicated class labels
///
/// Class order defines the layout of every node's `value` vector.
pub fn unique_classes(labels: &[String]) -> Vec<String> {
    let mut classes = labels.to_vec();
    classes.sort();
    classes.dedup();
    classes
}
