//! CLI command implementations.

pub mod describe;
pub mod fit;
pub mod fit_produce;
pub mod graph;
pub mod produce;

use std::path::Path;

use colored::Colorize;
use relsynth::OutputTable;

/// Write the output table to a file, or to stdout when no path is given.
pub(crate) fn write_output(
    output: &OutputTable,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            output.save_csv(path)?;
            eprintln!(
                "{} {} rows x {} columns to {}",
                "Wrote".green().bold(),
                output.n_rows(),
                output.n_columns(),
                path.display().to_string().white()
            );
        }
        None => output.write_csv(std::io::stdout().lock())?,
    }
    Ok(())
}
