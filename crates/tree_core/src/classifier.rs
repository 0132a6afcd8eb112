//! Classification backend interface
//!
//! The pipeline only talks to a backend through [`Classifier`], so any
//! implementation that can fit on a feature matrix and string labels can
//! stand in for the built-in tree.

use crate::errors::Result;
use crate::matrix::FeatureMatrix;

/// A classification backend
pub trait Classifier {
    /// Fitted model produced by this backend
    type Model;

    /// Fit a model on `features` against `target`
    ///
    /// `target` must have one label per feature row, in the same order.
    fn fit(&self, features: &FeatureMatrix, target: &[String]) -> Result<Self::Model>;

    /// Predict one label per feature row, in row order
    fn predict(&self, model: &Self::Model, features: &FeatureMatrix) -> Result<Vec<String>>;
}
