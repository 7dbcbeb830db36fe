//! Static description of the featurizer for host discovery.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Who publishes the primitive and where to find out more.
#[derive(Debug, Clone, Serialize)]
pub struct PrimitiveSource {
    pub name: &'static str,
    pub contact: &'static str,
    pub uris: Vec<&'static str>,
    pub license: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmType {
    DeepFeatureSynthesis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimitiveFamily {
    FeatureConstruction,
}

/// Identity and classification of a primitive.
#[derive(Debug, Clone, Serialize)]
pub struct PrimitiveMetadata {
    /// Stable identifier; never changes between versions.
    pub id: &'static str,
    pub version: &'static str,
    pub name: &'static str,
    /// Dotted path under which hosts register the primitive.
    pub path: &'static str,
    pub source: PrimitiveSource,
    pub algorithm_types: Vec<AlgorithmType>,
    pub primitive_family: PrimitiveFamily,
    pub keywords: Vec<&'static str>,
    pub hyperparameters_to_tune: Vec<&'static str>,
}

pub static MULTI_TABLE_METADATA: Lazy<PrimitiveMetadata> = Lazy::new(|| PrimitiveMetadata {
    id: "e659ef3a-f17c-4bbf-9e5a-13de79a4e55b",
    version: env!("CARGO_PKG_VERSION"),
    name: "Multi Table Deep Feature Synthesis",
    path: "primitives.feature_construction.deep_feature_synthesis.MultiTableFeaturization",
    source: PrimitiveSource {
        name: "relsynth",
        contact: "https://github.com/scotthandley/relsynth/issues",
        uris: vec!["https://github.com/scotthandley/relsynth"],
        license: "MIT",
    },
    algorithm_types: vec![AlgorithmType::DeepFeatureSynthesis],
    primitive_family: PrimitiveFamily::FeatureConstruction,
    keywords: vec![
        "featurization",
        "feature engineering",
        "feature extraction",
        "feature construction",
    ],
    hyperparameters_to_tune: vec!["max_percent_null", "max_correlation"],
});
