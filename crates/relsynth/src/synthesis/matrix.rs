//! Feature matrix - one row per target-entity instance, one column per feature.

use std::collections::HashMap;

use crate::dataset::Value;

/// A named column of feature values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<Value>,
}

impl FeatureColumn {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Fraction of missing values; 0 for an empty column.
    pub fn missing_fraction(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let missing = self.values.iter().filter(|v| v.is_missing()).count();
        missing as f64 / self.values.len() as f64
    }

    /// Numeric view of the column, or `None` when any present value is not
    /// numeric. Missing cells map to `None`.
    pub fn numeric_values(&self) -> Option<Vec<Option<f64>>> {
        self.values
            .iter()
            .map(|v| {
                if v.is_missing() {
                    Some(None)
                } else {
                    v.as_f64().map(Some)
                }
            })
            .collect()
    }
}

/// Rows indexed by target-entity primary key, columns in feature order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    index_name: String,
    index: Vec<Value>,
    columns: Vec<FeatureColumn>,
}

impl FeatureMatrix {
    /// Create a matrix with an index and no columns.
    pub fn new(index_name: impl Into<String>, index: Vec<Value>) -> Self {
        Self {
            index_name: index_name.into(),
            index,
            columns: Vec::new(),
        }
    }

    /// Append a column. Its length must match the index.
    pub fn push_column(&mut self, column: FeatureColumn) {
        debug_assert_eq!(column.values.len(), self.index.len());
        self.columns.push(column);
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.push_column(FeatureColumn::new(name, values));
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn index(&self) -> &[Value] {
        &self.index
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&FeatureColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Keep only the columns whose flag is set, preserving order.
    pub fn retain_columns(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.columns.len());
        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&false));
    }

    /// Replace infinities and NaN with `Null`.
    ///
    /// Fit and produce both call this before any null accounting so that a
    /// feature's missing-value semantics are the same in both.
    pub fn normalize_non_finite(&mut self) {
        for column in &mut self.columns {
            for value in &mut column.values {
                if matches!(value, Value::Float(f) if !f.is_finite()) {
                    *value = Value::Null;
                }
            }
        }
    }

    /// Reorder rows to follow `order`.
    ///
    /// Keys absent from the matrix produce all-missing rows; rows whose key is
    /// not in `order` are dropped.
    pub fn reindex(&self, order: &[Value]) -> FeatureMatrix {
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(self.index.len());
        for (row, key) in self.index.iter().enumerate() {
            if let Some(k) = key.key() {
                positions.entry(k).or_insert(row);
            }
        }

        let rows: Vec<Option<usize>> = order
            .iter()
            .map(|key| key.key().and_then(|k| positions.get(&k).copied()))
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values = rows
                    .iter()
                    .map(|row| row.map_or(Value::Null, |r| column.values[r].clone()))
                    .collect();
                FeatureColumn::new(column.name.clone(), values)
            })
            .collect();

        FeatureMatrix {
            index_name: self.index_name.clone(),
            index: order.to_vec(),
            columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> FeatureMatrix {
        FeatureMatrix::new("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)])
            .with_column("a", vec![Value::Float(1.0), Value::Float(f64::INFINITY), Value::Null])
            .with_column("b", vec![Value::Int(4), Value::Int(5), Value::Int(6)])
    }

    #[test]
    fn test_normalize_non_finite() {
        let mut m = matrix();
        m.normalize_non_finite();
        assert_eq!(m.column("a").unwrap().values[1], Value::Null);
        assert!((m.column("a").unwrap().missing_fraction() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_reindex_follows_order() {
        let m = matrix().reindex(&[Value::Int(3), Value::Int(1), Value::Int(9)]);
        assert_eq!(m.index(), &[Value::Int(3), Value::Int(1), Value::Int(9)]);
        assert_eq!(
            m.column("b").unwrap().values,
            vec![Value::Int(6), Value::Int(4), Value::Null]
        );
    }

    #[test]
    fn test_retain_columns() {
        let mut m = matrix();
        m.retain_columns(&[false, true]);
        assert_eq!(m.column_names(), vec!["b"]);
    }

    #[test]
    fn test_numeric_values() {
        let text = FeatureColumn::new("t", vec![Value::Text("x".into()), Value::Null]);
        assert!(text.numeric_values().is_none());
        let mixed = FeatureColumn::new("n", vec![Value::Bool(true), Value::Null, Value::Int(2)]);
        assert_eq!(mixed.numeric_values(), Some(vec![Some(1.0), None, Some(2.0)]));
    }
}
