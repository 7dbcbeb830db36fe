//! Variable typing - combining declared metadata with statistical inference.

use indexmap::IndexMap;
use tracing::trace;

use super::statistical::StatisticalAnalyzer;
use crate::dataset::Table;
use crate::schema::{ColumnMeta, VariableType};

/// Assigns a [`VariableType`] to every column of a table.
///
/// Precedence: primary key, foreign key, declared type, statistics.
pub struct VariableTyper {
    statistical_analyzer: StatisticalAnalyzer,
}

impl VariableTyper {
    pub fn new() -> Self {
        Self {
            statistical_analyzer: StatisticalAnalyzer::new(),
        }
    }

    /// Type every column of `table`, given its resolved primary key.
    pub fn type_table(&self, table: &Table, primary_key: &str) -> IndexMap<String, VariableType> {
        table
            .schema
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let vtype = self.type_column(table, idx, column, primary_key);
                trace!(table = %table.name, column = %column.name, ?vtype, "typed column");
                (column.name.clone(), vtype)
            })
            .collect()
    }

    fn type_column(
        &self,
        table: &Table,
        col_index: usize,
        column: &ColumnMeta,
        primary_key: &str,
    ) -> VariableType {
        if column.name == primary_key {
            return VariableType::Index;
        }
        if column.refers_to.is_some() {
            return VariableType::Id;
        }
        if let Some(declared) = column.declared_type {
            return declared.into();
        }
        self.statistical_analyzer
            .analyze_column(&table.data, col_index)
            .variable_type
    }
}

impl Default for VariableTyper {
    fn default() -> Self {
        Self::new()
    }
}
