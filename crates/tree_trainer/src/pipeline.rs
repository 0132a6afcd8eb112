//! End-to-end run: load, encode, fit, evaluate, render
//!
//! Stages run strictly in sequence and hand their outputs to the next one
//! by reference. Any failure aborts the run; nothing partial is returned.

use animal_tree_core::{Classifier, DecisionTree, FeatureMatrix};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::dataset::{ColumnType, Table};
use crate::encoding::{feature_categoricals, OneHotEncoder};
use crate::errors::Result;
use crate::evaluate::{evaluate, Evaluation};
use crate::render::{export_text, render_tree, Figure};
use crate::trainer::CartClassifier;

/// Rows shown in the debug preview of the loaded table
const PREVIEW_ROWS: usize = 5;

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub input: PathBuf,
    pub model: DecisionTree,
    /// In-sample accuracy in [0, 1]
    pub accuracy: f64,
    pub evaluation: Evaluation,
    pub feature_names: Vec<String>,
    pub class_names: Vec<String>,
    pub figure: Figure,
}

/// Serializable overview of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub rows: usize,
    pub features: Vec<String>,
    pub classes: Vec<String>,
    pub accuracy: f64,
    pub matches: usize,
    pub node_count: usize,
    pub leaves: usize,
    pub depth: usize,
}

impl PipelineOutput {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            input: self.input.display().to_string(),
            rows: self.evaluation.total,
            features: self.feature_names.clone(),
            classes: self.class_names.clone(),
            accuracy: self.accuracy,
            matches: self.evaluation.matches,
            node_count: self.model.node_count(),
            leaves: self.model.n_leaves(),
            depth: self.model.depth(),
        }
    }
}

/// Load the table and apply configured column type overrides
pub fn load_table(path: &Path, config: &PipelineConfig) -> Result<Table> {
    info!("Loading dataset from: {}", path.display());
    let mut table = Table::from_csv(path, config.delimiter_byte())?;

    for column in &config.encoding.continuous_columns {
        table.set_dtype(column, ColumnType::Numeric)?;
    }

    info!(
        "Loaded {} rows with {} columns",
        table.n_rows(),
        table.n_columns()
    );
    for row in table.head(PREVIEW_ROWS) {
        debug!("  {}", row.join(" | "));
    }
    Ok(table)
}

/// Build the feature matrix and target vector from a table
pub fn prepare(table: &Table, config: &PipelineConfig) -> Result<(FeatureMatrix, Vec<String>)> {
    let categorical = feature_categoricals(table);
    debug!("Categorical feature columns: {:?}", categorical);

    let encoder =
        OneHotEncoder::fit_with_separator(table, &categorical, &config.encoding.separator)?;
    let features = encoder.transform(table)?;
    let target = table.target()?;

    debug!("Features: {:?}", features.column_names());
    Ok((features, target))
}

/// Fit any backend and score it on the rows it was fitted on
pub fn fit_and_evaluate<C: Classifier>(
    classifier: &C,
    features: &FeatureMatrix,
    target: &[String],
) -> Result<(C::Model, Evaluation)> {
    let model = classifier.fit(features, target)?;
    let predictions = classifier.predict(&model, features)?;
    let evaluation = evaluate(&predictions, target)?;
    Ok((model, evaluation))
}

/// Run the whole pipeline on `path`
pub fn run_pipeline<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<PipelineOutput> {
    let path = path.as_ref();
    config.validate()?;

    let table = load_table(path, config)?;
    let (features, target) = prepare(&table, config)?;

    let classifier = CartClassifier::new(config.tree_config());
    let (model, evaluation) = fit_and_evaluate(&classifier, &features, &target)?;
    info!(
        "Training accuracy: {:.4} ({}/{})",
        evaluation.accuracy, evaluation.matches, evaluation.total
    );
    debug!("Tree:\n{}", export_text(&model, config.render.precision));

    let figure = render_tree(&model, &config.render)?;

    Ok(PipelineOutput {
        input: path.to_path_buf(),
        accuracy: evaluation.accuracy,
        feature_names: features.column_names().to_vec(),
        class_names: model.classes.clone(),
        model,
        evaluation,
        figure,
    })
}
