//! Feature pruning.
//!
//! Two filters run over a synthesized matrix and its descriptors, in this
//! order: [`drop_percent_null`] then [`select_one_of_correlated`]. Both keep
//! columns and descriptors in lockstep and preserve generation order.

mod correlation;
mod null;

pub use correlation::{pearson, select_one_of_correlated};
pub use null::drop_percent_null;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SynthError};
use crate::synthesis::{FeatureDescriptor, FeatureMatrix};

/// Thresholds for the two pruning filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PruneConfig {
    /// Columns whose missing fraction exceeds this are dropped.
    pub max_percent_null: f64,
    /// Of two columns whose |r| exceeds this, the later one is dropped.
    pub max_correlation: f64,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            max_percent_null: 0.5,
            max_correlation: 0.9,
        }
    }
}

/// Applies the null-ratio filter and then the correlation filter.
pub struct Pruner {
    config: PruneConfig,
}

impl Pruner {
    pub fn new() -> Self {
        Self::with_config(PruneConfig::default())
    }

    pub fn with_config(config: PruneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PruneConfig {
        &self.config
    }

    pub fn prune(
        &self,
        matrix: &FeatureMatrix,
        descriptors: &[FeatureDescriptor],
    ) -> Result<(FeatureMatrix, Vec<FeatureDescriptor>)> {
        let before = descriptors.len();
        let (matrix, descriptors) =
            drop_percent_null(matrix, descriptors, self.config.max_percent_null)?;
        let after_null = descriptors.len();
        let (matrix, descriptors) =
            select_one_of_correlated(&matrix, &descriptors, self.config.max_correlation)?;

        info!(
            candidates = before,
            dropped_null = before - after_null,
            dropped_correlated = after_null - descriptors.len(),
            retained = descriptors.len(),
            "pruned feature matrix"
        );
        Ok((matrix, descriptors))
    }
}

impl Default for Pruner {
    fn default() -> Self {
        Self::new()
    }
}

/// Columns and descriptors must pair up one to one.
fn check_lengths(matrix: &FeatureMatrix, descriptors: &[FeatureDescriptor]) -> Result<()> {
    if matrix.n_columns() != descriptors.len() {
        return Err(SynthError::FeatureMismatch {
            columns: matrix.n_columns(),
            descriptors: descriptors.len(),
        });
    }
    Ok(())
}

/// Apply a keep mask to both the matrix and its descriptors.
fn retain(
    matrix: &FeatureMatrix,
    descriptors: &[FeatureDescriptor],
    keep: &[bool],
) -> (FeatureMatrix, Vec<FeatureDescriptor>) {
    let mut pruned = matrix.clone();
    pruned.retain_columns(keep);
    let kept = descriptors
        .iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(d, _)| d.clone())
        .collect();
    (pruned, kept)
}
