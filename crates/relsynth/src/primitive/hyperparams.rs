//! Hyperparameters of the multi-table featurizer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::prune::PruneConfig;
use crate::synthesis::{AggPrimitive, ChunkSize, TransPrimitive};

/// Shape of the table returned by `produce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnResult {
    /// Original target-table columns followed by the features.
    Append,
    /// Original columns with attributes swapped out for the features.
    Replace,
    /// Primary key, features, then the target column if present.
    #[default]
    New,
}

/// Featurizer configuration.
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparams {
    /// Table to create features for. `None` starts from the dataset entry
    /// point.
    pub target_resource: Option<String>,
    /// Maximum number of primitives stacked in one feature.
    pub max_depth: usize,
    /// Maximum fraction of missing values in a returned feature.
    pub max_percent_null: f64,
    /// Maximum absolute correlation between two returned features.
    pub max_correlation: f64,
    /// Target-table column indices to synthesize from. Empty means all.
    pub use_columns: Vec<usize>,
    /// Target-table column indices to leave out. Only used when
    /// `use_columns` is empty.
    pub exclude_columns: Vec<usize>,
    pub return_result: ReturnResult,
    pub agg_primitives: Vec<AggPrimitive>,
    pub trans_primitives: Vec<TransPrimitive>,
    pub chunk_size: ChunkSize,
}

impl Default for Hyperparams {
    fn default() -> Self {
        Self {
            target_resource: None,
            max_depth: 2,
            max_percent_null: 0.5,
            max_correlation: 0.9,
            use_columns: Vec::new(),
            exclude_columns: Vec::new(),
            return_result: ReturnResult::New,
            agg_primitives: AggPrimitive::DEFAULTS.to_vec(),
            trans_primitives: TransPrimitive::DEFAULTS.to_vec(),
            chunk_size: ChunkSize::default(),
        }
    }
}

impl Hyperparams {
    /// Read hyperparameters from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SynthError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let hyperparams: Hyperparams = serde_json::from_reader(BufReader::new(file))?;
        hyperparams.validate()?;
        Ok(hyperparams)
    }

    /// Reject out-of-domain values.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(SynthError::Config("max_depth must be at least 1".to_string()));
        }
        check_unit_interval("max_percent_null", self.max_percent_null)?;
        check_unit_interval("max_correlation", self.max_correlation)?;
        if self.target_resource.as_deref() == Some("") {
            return Err(SynthError::Config("target_resource must not be empty".to_string()));
        }
        self.chunk_size.validate()
    }

    pub fn prune_config(&self) -> PruneConfig {
        PruneConfig {
            max_percent_null: self.max_percent_null,
            max_correlation: self.max_correlation,
        }
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SynthError::Config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}
