use tracing::debug;

use super::{check_lengths, retain};
use crate::error::Result;
use crate::synthesis::{FeatureDescriptor, FeatureMatrix};

/// Single-pass co-moment accumulator (Welford's algorithm extended to two
/// variables).
#[derive(Debug, Default)]
struct CoMoments {
    count: usize,
    mean_x: f64,
    mean_y: f64,
    m2_x: f64,
    m2_y: f64,
    c_xy: f64,
}

impl CoMoments {
    fn add(&mut self, x: f64, y: f64) {
        self.count += 1;
        let n = self.count as f64;
        let dx = x - self.mean_x;
        self.mean_x += dx / n;
        let dy = y - self.mean_y;
        self.mean_y += dy / n;
        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.c_xy += dx * (y - self.mean_y);
    }

    fn correlation(&self) -> Option<f64> {
        if self.count < 2 || self.m2_x <= 0.0 || self.m2_y <= 0.0 {
            return None;
        }
        let r = self.c_xy / (self.m2_x.sqrt() * self.m2_y.sqrt());
        r.is_finite().then_some(r)
    }
}

/// Pearson correlation over the rows where both values are present.
///
/// `None` when fewer than two such rows exist or either side is constant.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let mut moments = CoMoments::default();
    for (a, b) in x.iter().zip(y) {
        if let (Some(a), Some(b)) = (a, b) {
            moments.add(*a, *b);
        }
    }
    moments.correlation()
}

/// Drop the later column of every numeric pair whose absolute correlation
/// exceeds `max_correlation`.
///
/// Pairs are visited in generation order and every pair counts, including
/// pairs whose earlier column was itself dropped by another pair.
/// Non-numeric columns and pairs with undefined correlation are left alone.
pub fn select_one_of_correlated(
    matrix: &FeatureMatrix,
    descriptors: &[FeatureDescriptor],
    max_correlation: f64,
) -> Result<(FeatureMatrix, Vec<FeatureDescriptor>)> {
    check_lengths(matrix, descriptors)?;

    let numeric: Vec<Option<Vec<Option<f64>>>> = matrix
        .columns()
        .iter()
        .map(|c| c.numeric_values())
        .collect();

    let mut keep = vec![true; numeric.len()];
    for i in 0..numeric.len() {
        let Some(xi) = &numeric[i] else { continue };
        for j in (i + 1)..numeric.len() {
            if !keep[j] {
                continue;
            }
            let Some(xj) = &numeric[j] else { continue };
            let Some(r) = pearson(xi, xj) else { continue };
            let strength = r.abs().min(1.0);
            if strength > max_correlation {
                debug!(
                    kept = %matrix.columns()[i].name,
                    dropped = %matrix.columns()[j].name,
                    r,
                    "dropping correlated feature"
                );
                keep[j] = false;
            }
        }
    }

    Ok(retain(matrix, descriptors, &keep))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{floats, matrix_of};
    use super::*;
    use crate::dataset::Value;

    fn some(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().map(|x| Some(*x)).collect()
    }

    #[test]
    fn test_pearson_basics() {
        let r = pearson(&some(&[1.0, 2.0, 3.0]), &some(&[2.0, 4.0, 6.0])).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        let r = pearson(&some(&[1.0, 2.0, 3.0]), &some(&[3.0, 2.0, 1.0])).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
        assert!(pearson(&some(&[1.0, 1.0, 1.0]), &some(&[1.0, 2.0, 3.0])).is_none());
        assert!(pearson(&some(&[1.0]), &some(&[2.0])).is_none());
    }

    #[test]
    fn test_pearson_pairwise_complete() {
        let x = vec![Some(1.0), None, Some(2.0), Some(3.0)];
        let y = vec![Some(10.0), Some(-50.0), Some(20.0), Some(30.0)];
        let r = pearson(&x, &y).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_later_column_dropped() {
        let (matrix, descriptors) = matrix_of(&[
            ("mean", floats(&[1.0, 2.0, 3.0, 4.0])),
            ("sum", floats(&[10.0, 20.0, 30.0, 40.0])),
        ]);
        let (pruned, kept) = select_one_of_correlated(&matrix, &descriptors, 0.9).unwrap();
        assert_eq!(pruned.column_names(), vec!["mean"]);
        assert_eq!(kept[0].name, "mean");
    }

    #[test]
    fn test_negative_correlation_counts() {
        let (matrix, descriptors) = matrix_of(&[
            ("up", floats(&[1.0, 2.0, 3.0])),
            ("down", floats(&[3.0, 2.0, 1.0])),
        ]);
        let (pruned, _) = select_one_of_correlated(&matrix, &descriptors, 0.9).unwrap();
        assert_eq!(pruned.column_names(), vec!["up"]);
    }

    #[test]
    fn test_threshold_one_keeps_perfect_pairs() {
        let (matrix, descriptors) = matrix_of(&[
            ("a", floats(&[1.0, 2.0, 3.0])),
            ("b", floats(&[2.0, 4.0, 6.0])),
        ]);
        let (pruned, _) = select_one_of_correlated(&matrix, &descriptors, 1.0).unwrap();
        assert_eq!(pruned.n_columns(), 2);
    }

    #[test]
    fn test_constant_column_never_dropped() {
        let (matrix, descriptors) = matrix_of(&[
            ("a", floats(&[1.0, 2.0, 3.0])),
            ("flat", floats(&[5.0, 5.0, 5.0])),
        ]);
        let (pruned, _) = select_one_of_correlated(&matrix, &descriptors, 0.0).unwrap();
        assert_eq!(pruned.n_columns(), 2);
    }

    #[test]
    fn test_text_columns_ignored() {
        let text = vec![Value::from("x"), Value::from("y"), Value::from("z")];
        let (matrix, descriptors) = matrix_of(&[
            ("a", floats(&[1.0, 2.0, 3.0])),
            ("label", text.clone()),
            ("label_copy", text),
        ]);
        let (pruned, _) = select_one_of_correlated(&matrix, &descriptors, 0.5).unwrap();
        assert_eq!(pruned.n_columns(), 3);
    }

    #[test]
    fn test_dropped_column_still_drops_later() {
        // a~b over threshold and b~c over threshold, a~c under: both pairs
        // involving b are visited, so c goes even though b was dropped.
        let (matrix, descriptors) = matrix_of(&[
            ("a", floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])),
            ("b", floats(&[1.0, 2.0, 3.0, 4.0, 5.0, 7.5])),
            ("c", floats(&[1.5, 2.0, 3.0, 4.0, 5.0, 9.0])),
        ]);
        let (_, kept) = select_one_of_correlated(&matrix, &descriptors, 0.97).unwrap();
        let names: Vec<&str> = kept.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}
