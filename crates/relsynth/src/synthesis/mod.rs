//! Feature synthesis - the engine seam and its request types.
//!
//! Synthesis itself is delegated to a [`SynthesisEngine`]. The crate ships
//! [`BasicEngine`], a compact depth-limited engine covering identity, direct,
//! aggregation and transform features; other engines plug in through the
//! trait.

mod basic;
mod compute;
mod feature;
mod matrix;

pub use basic::BasicEngine;
pub use feature::{AggPrimitive, FeatureDescriptor, FeatureKind, TransPrimitive};
pub use matrix::{FeatureColumn, FeatureMatrix};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::graph::EntitySet;

/// Number of target rows computed per batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkSize {
    /// A fixed number of rows.
    Rows(usize),
    /// A fraction of all rows, in (0, 1].
    Fraction(f64),
}

impl ChunkSize {
    /// Rows per chunk for a matrix of `total` rows; never zero.
    pub fn rows_for(&self, total: usize) -> usize {
        let rows = match *self {
            ChunkSize::Rows(n) => n,
            ChunkSize::Fraction(f) => (f * total as f64).ceil() as usize,
        };
        rows.max(1)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            ChunkSize::Rows(0) => Err(SynthError::Config(
                "chunk_size must be at least one row".to_string(),
            )),
            ChunkSize::Fraction(f) if !(f > 0.0 && f <= 1.0) => Err(SynthError::Config(format!(
                "chunk_size fraction must be in (0, 1], got {}",
                f
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize::Fraction(0.5)
    }
}

/// Parameters of one synthesis call.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Entity the features describe.
    pub target_entity: String,
    /// Variables never used as inputs, keyed by entity id.
    pub ignore_variables: IndexMap<String, Vec<String>>,
    /// Maximum number of stacked primitives.
    pub max_depth: usize,
    pub agg_primitives: Vec<AggPrimitive>,
    pub trans_primitives: Vec<TransPrimitive>,
    pub chunk_size: ChunkSize,
}

impl SynthesisRequest {
    pub fn new(target_entity: impl Into<String>) -> Self {
        Self {
            target_entity: target_entity.into(),
            ignore_variables: IndexMap::new(),
            max_depth: 2,
            agg_primitives: AggPrimitive::DEFAULTS.to_vec(),
            trans_primitives: TransPrimitive::DEFAULTS.to_vec(),
            chunk_size: ChunkSize::default(),
        }
    }

    /// Whether `variable` of `entity` is on the ignore list.
    pub fn is_ignored(&self, entity: &str, variable: &str) -> bool {
        self.ignore_variables
            .get(entity)
            .is_some_and(|vars| vars.iter().any(|v| v == variable))
    }
}

/// A relational feature-synthesis engine.
pub trait SynthesisEngine {
    /// Generate candidate features for the request's target entity and
    /// compute them.
    ///
    /// The matrix has one column per returned descriptor, in the same order,
    /// and one row per target-entity instance.
    fn synthesize(
        &self,
        entityset: &EntitySet,
        request: &SynthesisRequest,
    ) -> Result<(FeatureMatrix, Vec<FeatureDescriptor>)>;

    /// Compute previously generated features on a (possibly new) entity set.
    fn recompute(
        &self,
        entityset: &EntitySet,
        target_entity: &str,
        features: &[FeatureDescriptor],
        chunk_size: ChunkSize,
    ) -> Result<FeatureMatrix>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_rows() {
        assert_eq!(ChunkSize::Fraction(0.5).rows_for(5), 3);
        assert_eq!(ChunkSize::Fraction(0.5).rows_for(0), 1);
        assert_eq!(ChunkSize::Rows(100).rows_for(5), 100);
    }

    #[test]
    fn test_chunk_validate() {
        assert!(ChunkSize::Rows(0).validate().is_err());
        assert!(ChunkSize::Fraction(0.0).validate().is_err());
        assert!(ChunkSize::Fraction(1.5).validate().is_err());
        assert!(ChunkSize::Fraction(f64::NAN).validate().is_err());
        assert!(ChunkSize::default().validate().is_ok());
    }

    #[test]
    fn test_chunk_size_json() {
        let rows: ChunkSize = serde_json::from_str("250").unwrap();
        assert_eq!(rows, ChunkSize::Rows(250));
        let frac: ChunkSize = serde_json::from_str("0.25").unwrap();
        assert_eq!(frac, ChunkSize::Fraction(0.25));
    }

    #[test]
    fn test_ignore_list() {
        let mut request = SynthesisRequest::new("customers");
        request
            .ignore_variables
            .insert("customers".into(), vec!["churned".into()]);
        assert!(request.is_ignored("customers", "churned"));
        assert!(!request.is_ignored("orders", "churned"));
    }
}
