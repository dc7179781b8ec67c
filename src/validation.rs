//! Relative-error comparison of two result files
//!
//! One trajectory is taken as the reference ("exact") and the other is
//! compared against it at selected data rows. Rows are counted over data
//! lines only, after comment and blank lines are dropped.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::output::{read_data_file, DataRecord};

/// Rows checked when the caller does not choose any
pub const DEFAULT_CHECK_ROWS: [usize; 9] = [1, 10, 50, 100, 200, 500, 1000, 1500, 2000];

/// |(estimate − exact) / exact|
///
/// Infinite when `exact` is zero and `estimate` is not; NaN when both are.
pub fn relative_error(estimate: f64, exact: f64) -> f64 {
    ((estimate - exact) / exact).abs()
}

/// Errors at one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowComparison {
    /// Row index among data lines (0-based)
    pub row: usize,
    /// Time of the estimate at that row
    pub t: f64,
    /// Relative error in θ
    pub theta: f64,
    /// Relative error in θ'
    pub theta_dot: f64,
}

impl RowComparison {
    /// Larger of the two errors (NaN-aware: a NaN error wins)
    pub fn worst(&self) -> f64 {
        if self.theta.is_nan() || self.theta_dot.is_nan() {
            f64::NAN
        } else {
            self.theta.max(self.theta_dot)
        }
    }
}

/// Compare `estimate` against `exact` at each of `rows`.
///
/// Rows past the end of either trajectory are skipped.
pub fn compare_records(
    estimate: &[DataRecord],
    exact: &[DataRecord],
    rows: &[usize],
) -> Vec<RowComparison> {
    rows.iter()
        .filter_map(|&row| {
            let (Some(a), Some(b)) = (estimate.get(row), exact.get(row)) else {
                debug!(row, "row missing from one of the trajectories");
                return None;
            };
            Some(RowComparison {
                row,
                t: a.t,
                theta: relative_error(a.theta, b.theta),
                theta_dot: relative_error(a.theta_dot, b.theta_dot),
            })
        })
        .collect()
}

/// Read two result files and compare them at `rows`.
pub fn compare_files(
    estimate: impl AsRef<Path>,
    exact: impl AsRef<Path>,
    rows: &[usize],
) -> Result<Vec<RowComparison>> {
    let estimate = read_data_file(BufReader::new(File::open(estimate)?))?;
    let exact = read_data_file(BufReader::new(File::open(exact)?))?;
    Ok(compare_records(&estimate, &exact, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(t: f64, theta: f64, theta_dot: f64) -> DataRecord {
        DataRecord {
            t,
            theta,
            theta_dot,
        }
    }

    #[test]
    fn test_relative_error() {
        assert_relative_eq!(relative_error(1.1, 1.0), 0.1, epsilon = 1e-12);
        assert_relative_eq!(relative_error(-0.9, -1.0), 0.1, epsilon = 1e-12);
        assert_eq!(relative_error(2.0, 2.0), 0.0);
        assert!(relative_error(1.0, 0.0).is_infinite());
        assert!(relative_error(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_compare_selected_rows() {
        let exact: Vec<_> = (0..5).map(|i| record(i as f64, 1.0, -2.0)).collect();
        let mut estimate = exact.clone();
        estimate[1].theta = 1.01;
        estimate[3].theta_dot = -2.2;

        let rows = compare_records(&estimate, &exact, &[1, 3]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].t, 1.0);
        assert_relative_eq!(rows[0].theta, 0.01, epsilon = 1e-12);
        assert_eq!(rows[0].theta_dot, 0.0);
        assert_relative_eq!(rows[1].worst(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_rows_past_end_skipped() {
        let a = vec![record(0.0, 1.0, 1.0); 3];
        let b = vec![record(0.0, 1.0, 1.0); 20];
        let rows = compare_records(&a, &b, &DEFAULT_CHECK_ROWS);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 1);
    }

    #[test]
    fn test_worst_propagates_nan() {
        let row = RowComparison {
            row: 0,
            t: 0.0,
            theta: f64::NAN,
            theta_dot: 0.5,
        };
        assert!(row.worst().is_nan());
    }

    #[test]
    fn test_compare_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.dat");
        let b = dir.path().join("b.dat");
        std::fs::write(&a, "# header\n0 1.0 2.0\n0.1 1.5 2.5\n\n").unwrap();
        std::fs::write(&b, "0 1.0 2.0\n0.1 1.0 2.5\n").unwrap();

        let rows = compare_files(&a, &b, &[0, 1]).unwrap();
        assert_eq!(rows[0].worst(), 0.0);
        assert_relative_eq!(rows[1].theta, 0.5, epsilon = 1e-12);
        assert!(compare_files(dir.path().join("missing.dat"), &b, &[0]).is_err());
    }
}
