//! Error types for the tree core crate

use thiserror::Error;

/// Errors raised while fitting or evaluating a tree model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// No rows to fit on
    #[error("cannot fit a classifier on an empty dataset")]
    EmptyDataset,

    /// A feature cell is not a usable number
    #[error("type mismatch in column '{column}' at row {row}: {reason}")]
    TypeMismatch {
        column: String,
        row: usize,
        reason: String,
    },

    /// Feature matrix and target (or model) disagree on shape
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// A target label is not part of the model's class list
    #[error("unknown class label: {0}")]
    UnknownClass(String),

    /// Tree structure is broken (dangling child index, missing root)
    #[error("invalid tree structure: {0}")]
    InvalidTree(String),
}

/// Result type for tree core operations
pub type Result<T> = std::result::Result<T, CoreError>;
