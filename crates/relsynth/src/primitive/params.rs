//! Fitted state and its JSON persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, SynthError};
use crate::graph::VariableTypes;
use crate::synthesis::FeatureDescriptor;

/// Everything `produce` needs from `fit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedState {
    /// Entity the features describe.
    pub target_entity: String,
    /// Retained features, in generation order.
    pub features: Vec<FeatureDescriptor>,
    /// Variable types of every entity at fit time.
    pub variable_types: VariableTypes,
    /// Digest of the training schema; see [`schema_digest`].
    pub training_digest: String,
}

/// Parameters exchanged through `get_params` / `set_params`.
///
/// `state` is `None` for an unfitted featurizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub state: Option<FittedState>,
}

impl Params {
    /// Save the parameters to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    SynthError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            SynthError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            SynthError::Persistence(format!("Failed to serialize params: {}", e))
        })?;

        Ok(())
    }

    /// Load parameters from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            SynthError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            SynthError::Persistence(format!(
                "Failed to parse params '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

/// SHA-256 over entity names, variable names and variable types.
pub fn schema_digest(types: &VariableTypes) -> String {
    let mut hasher = Sha256::new();
    for (entity, variables) in types {
        hasher.update(entity.as_bytes());
        hasher.update(b"\n");
        for (name, vtype) in variables {
            hasher.update(name.as_bytes());
            hasher.update(b":");
            hasher.update(format!("{:?}", vtype).as_bytes());
            hasher.update(b"\n");
        }
    }
    format!("sha256:{:x}", hasher.finalize())
}
