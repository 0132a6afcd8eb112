//! Pipeline configuration
//!
//! Every section has defaults, so an empty TOML file (or no file at all)
//! reproduces the plain run: read `animals-training.csv`, fit an
//! unconstrained Gini tree, render the figure in memory.

use animal_tree_core::Criterion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cart::TreeConfig;
use crate::errors::{PipelineError, Result};

/// Input file used when none is given
pub const DEFAULT_INPUT: &str = "animals-training.csv";

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input CSV path
    pub input: PathBuf,
    pub training: TrainingConfig,
    pub encoding: EncodingConfig,
    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            training: TrainingConfig::default(),
            encoding: EncodingConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Tree growth settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub criterion: Criterion,
    /// Unlimited when absent
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let tree = TreeConfig::default();
        Self {
            criterion: tree.criterion,
            max_depth: tree.max_depth,
            min_samples_split: tree.min_samples_split,
            min_samples_leaf: tree.min_samples_leaf,
        }
    }
}

impl From<&TrainingConfig> for TreeConfig {
    fn from(config: &TrainingConfig) -> Self {
        TreeConfig {
            criterion: config.criterion,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
        }
    }
}

/// Input parsing and indicator encoding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Field delimiter (single ASCII character)
    pub delimiter: char,
    /// Joins source column and category in indicator names
    pub separator: String,
    /// Columns read as numbers regardless of inferred type
    pub continuous_columns: Vec<String>,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            separator: crate::encoding::DEFAULT_SEPARATOR.to_string(),
            continuous_columns: Vec::new(),
        }
    }
}

/// Figure layout settings, in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub node_width: u32,
    pub node_height: u32,
    pub horizontal_gap: u32,
    pub level_gap: u32,
    pub margin: u32,
    pub font_size: f64,
    /// Decimal places for thresholds and impurities
    pub precision: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_width: 190,
            node_height: 92,
            horizontal_gap: 16,
            level_gap: 48,
            margin: 20,
            font_size: 13.0,
            precision: 3,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::FileNotFound(path.to_path_buf()),
            _ => PipelineError::Io(e),
        })?;

        let config: PipelineConfig = toml::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let training = &self.training;
        if training.min_samples_split < 2 {
            return Err(PipelineError::Config(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if training.min_samples_leaf < 1 {
            return Err(PipelineError::Config(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if training.max_depth == Some(0) {
            return Err(PipelineError::Config(
                "max_depth must be positive when set".to_string(),
            ));
        }

        if !self.encoding.delimiter.is_ascii() {
            return Err(PipelineError::Config(format!(
                "delimiter '{}' is not a single ASCII character",
                self.encoding.delimiter
            )));
        }

        let render = &self.render;
        if render.node_width == 0 || render.node_height == 0 {
            return Err(PipelineError::Config(
                "figure node size must be non-zero".to_string(),
            ));
        }
        if render.font_size.is_nan() || render.font_size <= 0.0 {
            return Err(PipelineError::Config(
                "font_size must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> u8 {
        self.encoding.delimiter as u8
    }

    pub fn tree_config(&self) -> TreeConfig {
        TreeConfig::from(&self.training)
    }
}
