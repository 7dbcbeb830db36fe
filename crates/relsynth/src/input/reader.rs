//! Delimited table reader for manifest resources.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::source::{DataTable, SourceMetadata};
use crate::error::{Result, SynthError};

/// Candidates tried when neither the config nor the extension settles it.
const SNIFF_CANDIDATES: &[u8] = &[b'\t', b',', b';', b'|'];
const SNIFF_RECORDS: usize = 10;

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Forced delimiter. `None` uses the file extension, then sniffing.
    pub delimiter: Option<u8>,
    /// Stop after this many data rows.
    pub max_rows: Option<usize>,
    pub quote: u8,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Reads one delimited file into a [`DataTable`]. The first record is the
/// header row; header names must be unique.
#[derive(Debug, Clone, Default)]
pub struct TableReader {
    config: ReaderConfig,
}

impl TableReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a file, returning its cells and provenance.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| SynthError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let delimiter = self
            .config
            .delimiter
            .or_else(|| delimiter_for_extension(path))
            .map_or_else(|| self.sniff(&contents), Ok)?;
        let table = self.read_bytes(&contents, delimiter)?;

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            format!("sha256:{:x}", Sha256::digest(&contents)),
            contents.len() as u64,
            format_name(delimiter).to_string(),
            table.row_count(),
            table.column_count(),
        );
        Ok((table, metadata))
    }

    /// Read in-memory bytes with a known delimiter.
    pub fn read_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = self.csv_reader(bytes, delimiter, true);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(String::is_empty) {
            return Err(SynthError::EmptyData("no header row".to_string()));
        }
        let mut seen = HashSet::with_capacity(headers.len());
        if let Some(column) = headers.iter().position(|h| !seen.insert(h.as_str())) {
            return Err(SynthError::Parse {
                row: 0,
                column,
                message: format!("duplicate header '{}'", headers[column]),
            });
        }

        let limit = self.config.max_rows.unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        for record in reader.records().take(limit) {
            let record = record?;
            // Ragged rows: missing cells read as null, extra cells are dropped
            let mut row: Vec<String> = record.iter().take(headers.len()).map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(DataTable::new(headers, rows))
    }

    /// Pick the candidate that splits the leading records into the same
    /// number of fields, preferring wider splits.
    fn sniff(&self, bytes: &[u8]) -> Result<u8> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(SynthError::EmptyData("file is empty".to_string()));
        }

        let mut best: Option<(usize, u8)> = None;
        for &candidate in SNIFF_CANDIDATES {
            let widths: Vec<usize> = self
                .csv_reader(bytes, candidate, false)
                .records()
                .take(SNIFF_RECORDS)
                .filter_map(|r| r.ok())
                .map(|r| r.len())
                .collect();
            let Some(&width) = widths.first() else {
                continue;
            };
            if width < 2 || widths.iter().any(|&w| w != width) {
                continue;
            }
            if best.is_none_or(|(best_width, _)| width > best_width) {
                best = Some((width, candidate));
            }
        }

        Ok(best.map_or(b',', |(_, delimiter)| delimiter))
    }

    fn csv_reader<'a>(&self, bytes: &'a [u8], delimiter: u8, headers: bool) -> csv::Reader<&'a [u8]> {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(self.config.quote)
            .has_headers(headers)
            .flexible(true)
            .from_reader(bytes)
    }
}

fn delimiter_for_extension(path: &Path) -> Option<u8> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(b','),
        "tsv" | "tab" => Some(b'\t'),
        "psv" => Some(b'|'),
        _ => None,
    }
}

fn format_name(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}
