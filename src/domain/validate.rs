use std::collections::HashSet;

use crate::domain::error::{Result, SolverError, WarmStartField};
use crate::models::{SparseRow, WarmStart};

/// Check that `row` is well formed: matching lengths, every index below
/// `bound`, no index repeated.
pub fn validate_sparse_row(row: &SparseRow, bound: usize, what: &str) -> Result<()> {
    if row.indices.len() != row.values.len() {
        return Err(SolverError::InvalidModel(format!(
            "{} has {} indices but {} values",
            what,
            row.indices.len(),
            row.values.len()
        )));
    }

    if let Some(&index) = row.indices.iter().find(|&&index| index >= bound) {
        return Err(SolverError::InvalidModel(format!(
            "{} references index {} but only {} are defined",
            what, index, bound
        )));
    }

    let mut seen = HashSet::with_capacity(row.indices.len());
    if let Some(&index) = row.indices.iter().find(|&&index| !seen.insert(index)) {
        return Err(SolverError::InvalidModel(format!(
            "{} repeats index {}",
            what, index
        )));
    }

    Ok(())
}

/// Check every supplied warm-start array against the current dimensions.
///
/// All arrays are checked before anything is applied, so a single bad array
/// rejects the whole start.
pub fn validate_warm_start(start: &WarmStart, num_cols: usize, num_rows: usize) -> Result<()> {
    let checks = [
        (WarmStartField::PrimalColumns, &start.primal_columns, num_cols),
        (WarmStartField::PrimalRows, &start.primal_rows, num_rows),
        (WarmStartField::DualColumns, &start.dual_columns, num_cols),
        (WarmStartField::DualRows, &start.dual_rows, num_rows),
    ];

    for (field, values, expected) in checks {
        if let Some(values) = values {
            if values.len() != expected {
                return Err(SolverError::InvalidWarmStart {
                    field,
                    expected,
                    got: values.len(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    #[test]
    fn test_validate_sparse_row_given_valid_row_should_return_ok() {
        let row = SparseRow::from_pairs(&[(0, 1.0), (2, 2.0)]);
        assert!(validate_sparse_row(&row, 3, "row").is_ok());
    }

    #[test]
    fn test_validate_sparse_row_given_out_of_range_index_should_return_error() {
        let row = SparseRow::from_pairs(&[(0, 1.0), (3, 2.0)]);
        let err = validate_sparse_row(&row, 3, "row 7").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidModel);
        assert_eq!(
            err.to_string(),
            "invalid model: row 7 references index 3 but only 3 are defined"
        );
    }

    #[test]
    fn test_validate_sparse_row_given_repeated_index_should_return_error() {
        let row = SparseRow {
            indices: vec![0, 0],
            values: vec![1.0, 2.0],
        };
        let err = validate_sparse_row(&row, 1, "objective").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidModel);
        assert_eq!(err.to_string(), "invalid model: objective repeats index 0");
    }

    #[test]
    fn test_validate_warm_start_given_matching_lengths_should_return_ok() {
        let start = WarmStart::new()
            .with_primal_columns(vec![0.0, 1.0])
            .with_primal_rows(vec![1.0])
            .with_dual_rows(vec![0.5]);
        assert!(validate_warm_start(&start, 2, 1).is_ok());
        assert!(validate_warm_start(&WarmStart::new(), 2, 1).is_ok());
    }

    #[test]
    fn test_validate_warm_start_given_one_bad_array_should_name_it() {
        let start = WarmStart::new()
            .with_primal_columns(vec![0.0, 1.0])
            .with_dual_columns(vec![0.0]);
        let err = validate_warm_start(&start, 2, 1).unwrap_err();
        assert_eq!(
            err,
            SolverError::InvalidWarmStart {
                field: WarmStartField::DualColumns,
                expected: 2,
                got: 1,
            }
        );
    }
}
