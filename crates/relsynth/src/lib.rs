//! relsynth: relational feature synthesis with unsupervised pruning.
//!
//! relsynth turns a multi-table dataset into a feature table for one of its
//! tables. Foreign keys are followed to stack aggregations, transforms and
//! parent lookups into candidate features; candidates that are mostly
//! missing or highly correlated with an earlier candidate are then dropped.
//!
//! # Pipeline
//!
//! - [`input`] loads a dataset manifest and its CSV/TSV tables
//! - [`graph`] builds a typed [`EntitySet`] from the tables and foreign keys
//! - [`synthesis`] generates and computes features behind the
//!   [`SynthesisEngine`] trait
//! - [`prune`] filters the feature matrix
//! - [`primitive`] wraps it all in a fit/produce interface
//!
//! # Example
//!
//! ```no_run
//! use relsynth::input::DatasetLoader;
//! use relsynth::primitive::{CallOptions, Fit, Hyperparams, MultiTableFeaturizer, Produce};
//!
//! let dataset = DatasetLoader::new().load("datasetDoc.json").unwrap();
//! let mut featurizer = MultiTableFeaturizer::new(Hyperparams::default()).unwrap();
//! featurizer.fit(&dataset, CallOptions::default()).unwrap();
//!
//! let output = featurizer.produce(&dataset, CallOptions::default()).unwrap().value;
//! println!("Columns: {:?}", output.column_names());
//! ```

pub mod dataset;
pub mod error;
pub mod graph;
pub mod inference;
pub mod input;
pub mod primitive;
pub mod prune;
pub mod schema;
pub mod synthesis;

pub use dataset::{Dataset, Table, Value};
pub use error::{Result, SynthError};
pub use graph::{EntitySet, GraphBuilder};
pub use primitive::{Hyperparams, MultiTableFeaturizer, OutputTable, Params, ReturnResult};
pub use prune::{PruneConfig, Pruner};
pub use synthesis::{BasicEngine, FeatureDescriptor, FeatureMatrix, SynthesisEngine};
