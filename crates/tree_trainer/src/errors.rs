use animal_tree_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the training pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("type mismatch in column '{column}' at row {row}: cannot parse '{value}' as a number")]
    TypeMismatch {
        column: String,
        row: usize,
        value: String,
    },

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("category '{value}' in column '{column}' was not seen during fitting")]
    UnseenCategory { column: String, value: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Coarse failure categories callers can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileNotFound,
    TypeMismatch,
    EmptyDataset,
    Other,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::FileNotFound(_) => ErrorKind::FileNotFound,
            PipelineError::Io(err) if err.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::FileNotFound
            }
            PipelineError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            PipelineError::Core(CoreError::TypeMismatch { .. }) => ErrorKind::TypeMismatch,
            PipelineError::Core(CoreError::EmptyDataset) => ErrorKind::EmptyDataset,
            _ => ErrorKind::Other,
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
