//! Animal Tree CLI
//!
//! Fits a decision tree on a CSV dataset and prints its training accuracy.

use animal_tree_core::Criterion;
use animal_tree_trainer::{export_text, run_pipeline, PipelineConfig};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CriterionArg {
    Gini,
    Entropy,
}

impl From<CriterionArg> for Criterion {
    fn from(arg: CriterionArg) -> Self {
        match arg {
            CriterionArg::Gini => Criterion::Gini,
            CriterionArg::Entropy => Criterion::Entropy,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "animal-tree")]
#[command(author = "Animal Tree Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fit a decision tree on tabular animal data", long_about = None)]
struct Args {
    /// Input CSV dataset path (header row, last column is the label)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Split criterion
    #[arg(long, value_enum)]
    criterion: Option<CriterionArg>,

    /// Maximum tree depth (unlimited by default)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Save the rendered tree as SVG
    #[arg(long)]
    figure: Option<PathBuf>,

    /// Print a JSON run summary instead of the bare accuracy
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Animal Tree v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path).context("Failed to load config")?,
        None => PipelineConfig::default(),
    };

    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(criterion) = args.criterion {
        config.training.criterion = criterion.into();
    }
    if args.max_depth.is_some() {
        config.training.max_depth = args.max_depth;
    }

    let output = run_pipeline(&config.input, &config)
        .with_context(|| format!("Pipeline failed for {}", config.input.display()))?;

    info!("Features: {}", output.feature_names.join(", "));
    info!("Classes: {}", output.class_names.join(", "));
    for line in export_text(&output.model, config.render.precision).lines() {
        info!("  {}", line);
    }

    if let Some(path) = &args.figure {
        output
            .figure
            .save(path)
            .context("Failed to write figure")?;
    }

    if args.json {
        let summary = serde_json::to_string_pretty(&output.summary())
            .context("Failed to serialize run summary")?;
        println!("{}", summary);
    } else {
        println!("{}", output.accuracy);
    }

    Ok(())
}
