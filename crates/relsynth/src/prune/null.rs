use tracing::debug;

use super::{check_lengths, retain};
use crate::error::Result;
use crate::synthesis::{FeatureDescriptor, FeatureMatrix};

/// Drop every column whose fraction of missing values exceeds
/// `max_percent_null`.
///
/// A column exactly at the threshold is kept. A matrix with no rows has a
/// missing fraction of 0 everywhere.
pub fn drop_percent_null(
    matrix: &FeatureMatrix,
    descriptors: &[FeatureDescriptor],
    max_percent_null: f64,
) -> Result<(FeatureMatrix, Vec<FeatureDescriptor>)> {
    check_lengths(matrix, descriptors)?;

    let keep: Vec<bool> = matrix
        .columns()
        .iter()
        .map(|column| {
            let fraction = column.missing_fraction();
            let keep = fraction <= max_percent_null;
            if !keep {
                debug!(feature = %column.name, fraction, "dropping mostly-null feature");
            }
            keep
        })
        .collect();

    Ok(retain(matrix, descriptors, &keep))
}
