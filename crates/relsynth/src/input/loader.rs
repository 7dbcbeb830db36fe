//! Dataset manifest loading.
//!
//! A manifest is a JSON document listing the resources of a dataset:
//!
//! ```json
//! {
//!   "id": "shop",
//!   "entry_point": "customers",
//!   "resources": [
//!     {
//!       "id": "customers",
//!       "path": "tables/customers.csv",
//!       "columns": [
//!         { "name": "customer_id", "type": "integer", "roles": ["primary_key"] },
//!         { "name": "name", "type": "categorical" }
//!       ]
//!     },
//!     {
//!       "id": "orders",
//!       "path": "tables/orders.csv",
//!       "columns": [
//!         { "name": "order_id", "roles": ["primary_key"] },
//!         { "name": "customer_id", "refers_to": { "resource": "customers", "column": "customer_id" } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Resource paths are relative to the manifest file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::reader::{ReaderConfig, TableReader};
use crate::dataset::{Dataset, ResourceKind, Table};
use crate::error::{Result, SynthError};
use crate::schema::ColumnMeta;

/// On-disk description of a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    pub resources: Vec<ResourceManifest>,
}

/// On-disk description of one resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceManifest {
    pub id: String,
    pub path: String,
    #[serde(default = "default_kind")]
    pub kind: ResourceKind,
    /// Column metadata; columns missing here are plain attributes.
    #[serde(default)]
    pub columns: Vec<ColumnMeta>,
}

fn default_kind() -> ResourceKind {
    ResourceKind::Table
}

/// Loads datasets from manifests.
pub struct DatasetLoader {
    reader: TableReader,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self {
            reader: TableReader::new(),
        }
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        Self {
            reader: TableReader::with_config(config),
        }
    }

    /// Read a manifest file and every table it lists.
    pub fn load(&self, manifest_path: impl AsRef<Path>) -> Result<Dataset> {
        let manifest_path = manifest_path.as_ref();
        let file = File::open(manifest_path).map_err(|e| SynthError::Io {
            path: manifest_path.to_path_buf(),
            source: e,
        })?;
        let manifest: DatasetManifest = serde_json::from_reader(BufReader::new(file))?;

        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        self.load_manifest(manifest, &base)
    }

    /// Materialize an already-parsed manifest, resolving paths against `base`.
    pub fn load_manifest(&self, manifest: DatasetManifest, base: &Path) -> Result<Dataset> {
        let mut dataset = Dataset::new(manifest.id);
        dataset.entry_point = manifest.entry_point;

        for resource in manifest.resources {
            if resource.kind != ResourceKind::Table {
                debug!(resource = %resource.id, kind = ?resource.kind, "registering non-tabular resource");
                dataset.insert_other(resource.id, resource.kind, resource.path);
                continue;
            }

            let path = base.join(&resource.path);
            let (data, source) = self.reader.read(&path)?;
            debug!(
                resource = %resource.id,
                rows = data.row_count(),
                columns = data.column_count(),
                hash = %source.hash,
                "loaded table"
            );
            let table = Table::new(resource.id, resource.columns, data).with_source(source);
            dataset.insert_table(table);
        }

        Ok(dataset)
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_defaults() {
        let json = r#"{
            "id": "d",
            "resources": [
                { "id": "t", "path": "t.csv" },
                { "id": "img", "path": "media/", "kind": "image" }
            ]
        }"#;
        let manifest: DatasetManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.entry_point, None);
        assert_eq!(manifest.resources[0].kind, ResourceKind::Table);
        assert_eq!(manifest.resources[1].kind, ResourceKind::Image);
        assert!(manifest.resources[0].columns.is_empty());
    }

    #[test]
    fn test_column_meta_from_manifest() {
        let json = r#"{ "name": "customer_id", "type": "integer",
                        "refers_to": { "resource": "customers", "column": "customer_id" } }"#;
        let column: ColumnMeta = serde_json::from_str(json).unwrap();
        assert!(column.is_attribute());
        assert_eq!(column.refers_to.unwrap().resource, "customers");
    }
}
