//! Animal Tree trainer
//!
//! Loads a tabular dataset, expands categorical columns into indicator
//! columns, fits a deterministic CART classification tree, reports
//! in-sample accuracy and renders the fitted tree as a figure.

pub mod cart;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod encoding;
pub mod errors;
pub mod evaluate;
pub mod pipeline;
pub mod render;
pub mod trainer;

pub use cart::{CartBuilder, TreeConfig};
pub use config::{EncodingConfig, PipelineConfig, RenderConfig, TrainingConfig, DEFAULT_INPUT};
pub use dataset::{ColumnType, Table};
pub use encoding::{encode, OneHotEncoder};
pub use errors::{ErrorKind, PipelineError};
pub use evaluate::{accuracy, evaluate, ConfusionCell, Evaluation};
pub use pipeline::{fit_and_evaluate, run_pipeline, PipelineOutput, RunSummary};
pub use render::{export_text, render_tree, Figure};
pub use trainer::CartClassifier;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
