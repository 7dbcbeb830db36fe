//! Error types for the relsynth library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for relsynth operations.
#[derive(Debug, Error)]
pub enum SynthError {
    /// The dataset cannot be turned into an entity graph.
    ///
    /// Raised for a missing or non-unique primary key, a dangling foreign key,
    /// or an unresolvable target resource. Never retried.
    #[error("Cannot build entity graph for resource '{resource}': {message}")]
    Construction { resource: String, message: String },

    /// `produce` was called before a successful `fit`.
    #[error("Primitive not fitted")]
    NotFitted,

    /// A feature matrix and its descriptor list disagree in length.
    #[error("Feature matrix has {columns} columns but {descriptors} descriptors were given")]
    FeatureMismatch { columns: usize, descriptors: usize },

    /// A feature references an entity or variable that the graph does not have.
    #[error("Cannot compute feature '{feature}': {message}")]
    UnknownFeature { feature: String, message: String },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a value or manifest field.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error saving or loading fitted state.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SynthError {
    /// Shorthand for a construction error on a named resource.
    pub fn construction(resource: impl Into<String>, message: impl Into<String>) -> Self {
        SynthError::Construction {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for relsynth operations.
pub type Result<T> = std::result::Result<T, SynthError>;
