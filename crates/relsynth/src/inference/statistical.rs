//! Statistical analysis for column type inference from raw cells.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::DataTable;
use crate::schema::{ColumnType, VariableType};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Date patterns compiled once on first use.

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(), // ISO date
        Regex::new(r"^\d{2}/\d{2}/\d{4}").unwrap(), // US date
        Regex::new(r"^\d{2}-\d{2}-\d{4}").unwrap(), // European date
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(), // Alt ISO
    ]
});

/// Results from statistical analysis of a column.
#[derive(Debug, Clone)]
pub struct StatisticalAnalysis {
    /// Inferred storage type.
    pub inferred_type: ColumnType,
    /// Variable type proposed for synthesis.
    pub variable_type: VariableType,
    /// Total number of values (including nulls).
    pub count: usize,
    /// Number of null/missing values.
    pub null_count: usize,
    /// Number of unique non-null values.
    pub unique_count: usize,
    /// Share of non-null values agreeing with the inferred type.
    pub confidence: f64,
}

/// Performs statistical analysis on raw column values.
pub struct StatisticalAnalyzer {
    /// Maximum unique values to consider a string column categorical.
    categorical_threshold: usize,
    /// Mean words per value above which a string column is free text.
    text_word_threshold: f64,
}

impl StatisticalAnalyzer {
    /// Create a new statistical analyzer with default settings.
    pub fn new() -> Self {
        Self {
            categorical_threshold: 20,
            text_word_threshold: 3.0,
        }
    }

    /// Analyze a column of raw cells.
    pub fn analyze_values<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> StatisticalAnalysis {
        let values: Vec<&str> = values.into_iter().collect();
        let total_count = values.len();

        let non_null_values: Vec<&str> = values
            .iter()
            .copied()
            .filter(|v| !DataTable::is_null_value(v))
            .collect();
        let null_count = total_count - non_null_values.len();

        let mut value_counts: IndexMap<&str, usize> = IndexMap::new();
        for v in &non_null_values {
            *value_counts.entry(v.trim()).or_insert(0) += 1;
        }
        let unique_count = value_counts.len();

        let (inferred_type, confidence) = self.infer_type(&non_null_values);
        let variable_type = self.infer_variable_type(inferred_type, unique_count, &non_null_values);

        StatisticalAnalysis {
            inferred_type,
            variable_type,
            count: total_count,
            null_count,
            unique_count,
            confidence,
        }
    }

    /// Analyze a column of a data table by position.
    pub fn analyze_column(&self, table: &DataTable, col_index: usize) -> StatisticalAnalysis {
        self.analyze_values(table.column_values(col_index))
    }

    /// Infer the data type from values.
    fn infer_type(&self, values: &[&str]) -> (ColumnType, f64) {
        if values.is_empty() {
            return (ColumnType::Unknown, 0.0);
        }

        let mut type_counts = HashMap::new();
        for &value in values {
            let detected = self.detect_value_type(value);
            *type_counts.entry(detected).or_insert(0usize) += 1;
        }

        // Ties resolve toward the more general type so inference is stable
        let (best_type, count) = type_counts
            .iter()
            .max_by_key(|&(t, count)| (*count, type_rank(*t)))
            .map(|(t, c)| (*t, *c))
            .unwrap_or((ColumnType::String, 0));

        let confidence = count as f64 / values.len() as f64;

        // Mostly integers with some floats promote to float
        if best_type == ColumnType::Integer && type_counts.contains_key(&ColumnType::Float) {
            return (ColumnType::Float, confidence * 0.95);
        }

        (best_type, confidence)
    }

    /// Detect the type of a single value.
    fn detect_value_type(&self, value: &str) -> ColumnType {
        let trimmed = value.trim();

        if matches!(
            trimmed.to_lowercase().as_str(),
            "true" | "false" | "yes" | "no"
        ) {
            return ColumnType::Boolean;
        }

        if trimmed.parse::<i64>().is_ok() {
            return ColumnType::Integer;
        }

        if trimmed.parse::<f64>().is_ok() {
            return ColumnType::Float;
        }

        if self.looks_like_date(trimmed) {
            if trimmed.contains(':') || trimmed.contains('T') {
                return ColumnType::DateTime;
            }
            return ColumnType::Date;
        }

        ColumnType::String
    }

    /// Check if a value looks like a date.
    fn looks_like_date(&self, value: &str) -> bool {
        DATE_PATTERNS.iter().any(|pattern| pattern.is_match(value))
    }

    /// Map a storage type to the variable type used for synthesis.
    fn infer_variable_type(
        &self,
        column_type: ColumnType,
        unique_count: usize,
        values: &[&str],
    ) -> VariableType {
        match column_type {
            ColumnType::Integer | ColumnType::Float => VariableType::Numeric,
            ColumnType::Boolean => VariableType::Boolean,
            ColumnType::DateTime | ColumnType::Date => VariableType::Datetime,
            ColumnType::String => {
                if unique_count <= self.categorical_threshold {
                    return VariableType::Categorical;
                }
                let words: usize = values.iter().map(|v| v.split_whitespace().count()).sum();
                let mean_words = words as f64 / values.len().max(1) as f64;
                if mean_words >= self.text_word_threshold {
                    VariableType::Text
                } else {
                    VariableType::Categorical
                }
            }
            ColumnType::Unknown => VariableType::Categorical,
        }
    }
}

impl Default for StatisticalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Generality order used to break ties between detected types.
fn type_rank(column_type: ColumnType) -> u8 {
    match column_type {
        ColumnType::String => 6,
        ColumnType::Float => 5,
        ColumnType::Integer => 4,
        ColumnType::DateTime => 3,
        ColumnType::Date => 2,
        ColumnType::Boolean => 1,
        ColumnType::Unknown => 0,
    }
}
