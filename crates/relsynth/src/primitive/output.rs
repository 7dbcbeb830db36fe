//! Tabular output of `produce`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::dataset::Value;
use crate::error::{Result, SynthError};

/// A named column of output values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputColumn {
    pub name: String,
    pub values: Vec<Value>,
}

/// Ordered named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputTable {
    columns: Vec<OutputColumn>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Its length must match the existing columns.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        debug_assert!(self.columns.is_empty() || values.len() == self.n_rows());
        self.columns.push(OutputColumn {
            name: name.into(),
            values,
        });
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    /// First column with this name.
    pub fn column(&self, name: &str) -> Option<&OutputColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Write as CSV with a header row. Missing values are empty cells.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in 0..self.n_rows() {
            csv.write_record(self.columns.iter().map(|c| c.values[row].to_string()))?;
        }
        csv.flush().map_err(|e| SynthError::Csv(e.into()))?;
        Ok(())
    }

    /// Write as CSV to a file, creating or truncating it.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SynthError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.write_csv(BufWriter::new(file))
    }
}
