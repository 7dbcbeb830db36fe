//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use relsynth::{Hyperparams, ReturnResult};

/// relsynth: relational feature synthesis with unsupervised pruning
#[derive(Parser)]
#[command(name = "relsynth")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit on a training dataset and save the fitted params
    Fit {
        /// Path to the dataset manifest (JSON)
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Output path for fitted params
        #[arg(short, long, default_value = "params.json")]
        output: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Produce features for a dataset using saved params
    Produce {
        /// Path to the dataset manifest (JSON)
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Fitted params written by `fit`
        #[arg(short, long)]
        params: PathBuf,

        /// Output CSV path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output shape
        #[arg(long, default_value = "new")]
        return_result: ReturnResultChoice,
    },

    /// Fit on one dataset and produce features for another
    FitProduce {
        /// Training dataset manifest
        #[arg(value_name = "TRAIN")]
        train: PathBuf,

        /// Dataset to produce features for
        #[arg(value_name = "TEST")]
        test: PathBuf,

        /// Output CSV path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the fitted params here
        #[arg(long)]
        params_out: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Show the entity graph built from a dataset
    Graph {
        /// Path to the dataset manifest (JSON)
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the primitive's metadata and default hyperparameters
    Describe {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Hyperparameter file plus per-field overrides.
#[derive(Args, Debug, Clone)]
pub struct TuningArgs {
    /// Hyperparameters JSON file; flags below override its fields
    #[arg(long, value_name = "FILE")]
    pub hyperparams: Option<PathBuf>,

    /// Table to create features for (default: dataset entry point)
    #[arg(long)]
    pub target_resource: Option<String>,

    /// Maximum number of stacked primitives
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Maximum fraction of missing values per feature, in [0, 1]
    #[arg(long)]
    pub max_percent_null: Option<f64>,

    /// Maximum absolute correlation between features, in [0, 1]
    #[arg(long)]
    pub max_correlation: Option<f64>,

    /// Output shape
    #[arg(long)]
    pub return_result: Option<ReturnResultChoice>,
}

impl TuningArgs {
    /// Load the hyperparameter file, if any, and apply the overrides.
    pub fn resolve(&self) -> Result<Hyperparams, Box<dyn std::error::Error>> {
        let mut hp = match &self.hyperparams {
            Some(path) => Hyperparams::load(path)?,
            None => Hyperparams::default(),
        };
        if let Some(target) = &self.target_resource {
            hp.target_resource = Some(target.clone());
        }
        if let Some(depth) = self.max_depth {
            hp.max_depth = depth;
        }
        if let Some(null) = self.max_percent_null {
            hp.max_percent_null = null;
        }
        if let Some(corr) = self.max_correlation {
            hp.max_correlation = corr;
        }
        if let Some(choice) = self.return_result {
            hp.return_result = choice.into();
        }
        hp.validate()?;
        Ok(hp)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReturnResultChoice {
    Append,
    Replace,
    New,
}

impl From<ReturnResultChoice> for ReturnResult {
    fn from(choice: ReturnResultChoice) -> Self {
        match choice {
            ReturnResultChoice::Append => ReturnResult::Append,
            ReturnResultChoice::Replace => ReturnResult::Replace,
            ReturnResultChoice::New => ReturnResult::New,
        }
    }
}
