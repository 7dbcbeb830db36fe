//! Multi-table dataset model.
//!
//! A [`Dataset`] is an ordered collection of resources. Table resources carry a
//! [`TableSchema`] and raw rows; foreign keys declared on columns define the
//! relations between tables.

mod value;

pub use value::Value;

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::input::{DataTable, SourceMetadata};
use crate::schema::{ColumnMeta, TableSchema};

/// Kind of a dataset resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Table,
    Image,
    Text,
    Audio,
    Video,
    Graph,
    Raw,
}

/// A tabular resource.
#[derive(Debug, Clone)]
pub struct Table {
    /// Resource id.
    pub name: String,
    /// Column metadata.
    pub schema: TableSchema,
    /// Raw cells, in row order.
    pub data: DataTable,
    /// Where the table was read from, if it came from disk.
    pub source: Option<SourceMetadata>,
    /// Declared columns with no matching header.
    unmatched: Vec<ColumnMeta>,
}

impl Table {
    /// Create a table, aligning the schema with the data headers.
    ///
    /// Headers without metadata get a plain attribute column. Metadata for a
    /// column the data does not have is kept aside and reported by
    /// [`Table::check`].
    pub fn new(name: impl Into<String>, columns: Vec<ColumnMeta>, data: DataTable) -> Self {
        let mut by_name: IndexMap<String, ColumnMeta> =
            columns.into_iter().map(|c| (c.name.clone(), c)).collect();
        let aligned = data
            .headers
            .iter()
            .map(|h| by_name.shift_remove(h).unwrap_or_else(|| ColumnMeta::new(h.clone())))
            .collect();

        Self {
            name: name.into(),
            schema: TableSchema::with_columns(aligned),
            data,
            source: None,
            unmatched: by_name.into_values().collect(),
        }
    }

    /// Reject headers that repeat and metadata that names no header.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.data.headers.len());
        if let Some(header) = self.data.headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(SynthError::construction(
                &self.name,
                format!("duplicate column '{}'", header),
            ));
        }
        if let Some(column) = self.unmatched.first() {
            let message = match &column.refers_to {
                Some(fk) => format!(
                    "declared column '{}' (references '{}.{}') is not in the data",
                    column.name, fk.resource, fk.column
                ),
                None => format!("declared column '{}' is not in the data", column.name),
            };
            return Err(SynthError::construction(&self.name, message));
        }
        Ok(())
    }

    /// Attach file provenance.
    pub fn with_source(mut self, source: SourceMetadata) -> Self {
        self.source = Some(source);
        self
    }

    pub fn row_count(&self) -> usize {
        self.data.row_count()
    }

    /// Raw cells of a named column.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        self.data.column_by_name(name)
    }
}

/// One resource of a dataset.
#[derive(Debug, Clone)]
pub enum Resource {
    Table(Table),
    /// Non-tabular resources are carried along but never featurized.
    Other { kind: ResourceKind, path: String },
}

impl Resource {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Resource::Table(t) => Some(t),
            Resource::Other { .. } => None,
        }
    }
}

/// One half of a bidirectional relation listing, seen from the resource it is
/// stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationLink {
    /// The resource on the other end.
    pub other: String,
    /// True when `other` is the parent (this resource holds the foreign key).
    pub other_is_parent: bool,
    /// Column on this resource.
    pub column: String,
    /// Column on the other resource.
    pub other_column: String,
}

/// A collection of named resources.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Dataset identifier.
    pub id: String,
    /// Declared entry-point resource.
    pub entry_point: Option<String>,
    resources: IndexMap<String, Resource>,
}

impl Dataset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entry_point: None,
            resources: IndexMap::new(),
        }
    }

    /// Set the entry-point resource.
    pub fn with_entry_point(mut self, resource: impl Into<String>) -> Self {
        self.entry_point = Some(resource.into());
        self
    }

    /// Add a table resource, replacing any resource with the same name.
    pub fn with_table(mut self, table: Table) -> Self {
        self.insert_table(table);
        self
    }

    /// Tables are always stored under their own name.
    pub fn insert_table(&mut self, table: Table) {
        self.resources.insert(table.name.clone(), Resource::Table(table));
    }

    /// Register a non-tabular resource.
    pub fn insert_other(&mut self, id: impl Into<String>, kind: ResourceKind, path: impl Into<String>) {
        self.resources.insert(
            id.into(),
            Resource::Other {
                kind,
                path: path.into(),
            },
        );
    }

    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.resources.get(id).and_then(Resource::as_table)
    }

    /// All resources in insertion order.
    pub fn resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All table resources in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.resources.values().filter_map(Resource::as_table)
    }

    /// Bidirectional relation listing keyed by resource id.
    ///
    /// Every declared foreign key appears twice: under the child with
    /// `other_is_parent = true` and under the parent with `false`. Every table
    /// has an entry, possibly empty.
    pub fn relations_graph(&self) -> IndexMap<String, Vec<RelationLink>> {
        let mut graph: IndexMap<String, Vec<RelationLink>> = self
            .tables()
            .map(|t| (t.name.clone(), Vec::new()))
            .collect();

        for table in self.tables() {
            for column in table.schema.foreign_keys() {
                let Some(fk) = &column.refers_to else {
                    continue;
                };
                graph.entry(table.name.clone()).or_default().push(RelationLink {
                    other: fk.resource.clone(),
                    other_is_parent: true,
                    column: column.name.clone(),
                    other_column: fk.column.clone(),
                });
                graph.entry(fk.resource.clone()).or_default().push(RelationLink {
                    other: table.name.clone(),
                    other_is_parent: false,
                    column: fk.column.clone(),
                    other_column: column.name.clone(),
                });
            }
        }

        graph
    }
}
