//! Table-level schema definition.

use serde::{Deserialize, Serialize};

use super::column::ColumnMeta;
use super::types::ColumnRole;

/// Column name conventionally used for row indices when no primary key is
/// declared.
pub const DEFAULT_INDEX_COLUMN: &str = "d3mIndex";

/// Schema for an entire table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    /// Column metadata, in file order.
    pub columns: Vec<ColumnMeta>,
}

impl TableSchema {
    /// Create a table schema with the given columns.
    pub fn with_columns(columns: Vec<ColumnMeta>) -> Self {
        Self { columns }
    }

    /// Get a column by name.
    pub fn get_column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Find the primary-key column.
    ///
    /// An explicit `primary_key` role wins; otherwise a column named
    /// [`DEFAULT_INDEX_COLUMN`] is used.
    pub fn primary_key(&self) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|c| c.has_role(ColumnRole::PrimaryKey))
            .or_else(|| self.get_column(DEFAULT_INDEX_COLUMN))
    }

    /// Find the target column.
    ///
    /// A true target wins over a suggested one.
    pub fn target_column(&self) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|c| c.has_role(ColumnRole::Target))
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|c| c.has_role(ColumnRole::SuggestedTarget))
            })
    }

    /// Columns carrying a foreign-key reference.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter().filter(|c| c.refers_to.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_falls_back_to_index_name() {
        let schema = TableSchema::with_columns(vec![
            ColumnMeta::new("d3mIndex"),
            ColumnMeta::new("value"),
        ]);
        assert_eq!(schema.primary_key().map(|c| c.name.as_str()), Some("d3mIndex"));
    }

    #[test]
    fn test_explicit_primary_key_wins() {
        let schema = TableSchema::with_columns(vec![
            ColumnMeta::new("d3mIndex"),
            ColumnMeta::primary_key("id"),
        ]);
        assert_eq!(schema.primary_key().map(|c| c.name.as_str()), Some("id"));
    }

    #[test]
    fn test_true_target_preferred() {
        let schema = TableSchema::with_columns(vec![
            ColumnMeta::primary_key("id"),
            ColumnMeta::new("guess").with_roles(vec![ColumnRole::SuggestedTarget]),
            ColumnMeta::new("label").with_roles(vec![ColumnRole::Target]),
        ]);
        assert_eq!(schema.target_column().map(|c| c.name.as_str()), Some("label"));
    }

    #[test]
    fn test_no_primary_key() {
        let schema = TableSchema::with_columns(vec![ColumnMeta::new("value")]);
        assert!(schema.primary_key().is_none());
    }
}
