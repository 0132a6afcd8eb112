//! In-sample evaluation
//!
//! Compares predictions with the target row by row. When the model was
//! fitted on the same rows this measures memorization, not generalization.

use animal_tree_core::{CoreError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// One cell of the confusion table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionCell {
    pub actual: String,
    pub predicted: String,
    pub count: usize,
}

/// Result of comparing predictions against the target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Rows where prediction equals target exactly
    pub matches: usize,
    pub total: usize,
    /// `matches / total`, always within [0, 1]
    pub accuracy: f64,
    /// Non-zero (actual, predicted) pairs, sorted by label
    pub confusion: Vec<ConfusionCell>,
}

impl Evaluation {
    pub fn misclassified(&self) -> usize {
        self.total - self.matches
    }
}

/// Score `predictions` against `target`
pub fn evaluate(predictions: &[String], target: &[String]) -> Result<Evaluation> {
    if target.is_empty() {
        return Err(CoreError::EmptyDataset);
    }
    if predictions.len() != target.len() {
        return Err(CoreError::ShapeMismatch {
            expected: target.len(),
            actual: predictions.len(),
        });
    }

    let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    let mut matches = 0;
    for (predicted, actual) in predictions.iter().zip(target) {
        if predicted == actual {
            matches += 1;
        }
        *pairs.entry((actual.as_str(), predicted.as_str())).or_default() += 1;
    }

    let confusion = pairs
        .into_iter()
        .map(|((actual, predicted), count)| ConfusionCell {
            actual: actual.to_string(),
            predicted: predicted.to_string(),
            count,
        })
        .collect();

    Ok(Evaluation {
        matches,
        total: target.len(),
        accuracy: matches as f64 / target.len() as f64,
        confusion,
    })
}

/// Fraction of exact label matches
pub fn accuracy(predictions: &[String], target: &[String]) -> Result<f64> {
    Ok(evaluate(predictions, target)?.accuracy)
}
