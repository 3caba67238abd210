use serde::{Deserialize, Serialize};

/// A vector stored as parallel index/value arrays holding only non-zero entries.
///
/// Indices are expected to be strictly increasing. The codec keeps the order it
/// is given, so callers feeding explicit indices must supply them sorted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SparseRow {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseRow {
    pub fn new() -> Self {
        SparseRow::default()
    }

    /// Compress a dense slice, dropping zeros.
    pub fn from_dense(values: &[f64]) -> Self {
        sparse_row(values.iter().copied(), None)
    }

    /// Compress `(index, value)` pairs, dropping zero values.
    pub fn from_pairs(pairs: &[(usize, f64)]) -> Self {
        let indices: Vec<usize> = pairs.iter().map(|&(i, _)| i).collect();
        sparse_row(pairs.iter().map(|&(_, v)| v), Some(&indices))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Largest index plus one, or 0 for an empty row.
    pub fn span(&self) -> usize {
        self.indices.iter().max().map_or(0, |&i| i + 1)
    }

    /// Expand into a dense vector of length `len`. Entries at or beyond `len` are ignored.
    pub fn to_dense(&self, len: usize) -> Vec<f64> {
        let mut dense = vec![0.0; len];
        for (index, value) in self.iter() {
            if let Some(slot) = dense.get_mut(index) {
                *slot = value;
            }
        }
        dense
    }
}

/// Build a [`SparseRow`] from `values` and an optional parallel index list.
///
/// Position `i` is kept only when `values[i] != 0`; its index is `indices[i]`
/// when supplied, otherwise `i`. Positions past the end of `indices` fall back
/// to their own position. The first pass counts non-zeros so both output
/// arrays are allocated exactly once.
pub fn sparse_row<I>(values: I, indices: Option<&[usize]>) -> SparseRow
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let values = values.into_iter();
    let non_zero = values.clone().filter(|&v| v != 0.0).count();

    let mut row = SparseRow {
        indices: Vec::with_capacity(non_zero),
        values: Vec::with_capacity(non_zero),
    };

    for (position, value) in values.enumerate() {
        if value == 0.0 {
            continue;
        }
        let index = indices
            .and_then(|given| given.get(position).copied())
            .unwrap_or(position);
        row.indices.push(index);
        row.values.push(value);
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_row_given_dense_values_should_drop_zeros_and_keep_positions() {
        let row = sparse_row(vec![0.0, 1.5, 0.0, -2.0], None);
        assert_eq!(row.indices, vec![1, 3]);
        assert_eq!(row.values, vec![1.5, -2.0]);
    }

    #[test]
    fn test_sparse_row_given_explicit_indices_should_preserve_caller_indices() {
        let row = sparse_row(vec![3.0, 0.0, 4.0], Some(&[2, 5, 9]));
        assert_eq!(row.indices, vec![2, 9]);
        assert_eq!(row.values, vec![3.0, 4.0]);
    }

    #[test]
    fn test_sparse_row_given_short_index_list_should_fall_back_to_position() {
        let row = sparse_row(vec![1.0, 2.0, 3.0], Some(&[7]));
        assert_eq!(row.indices, vec![7, 1, 2]);
        assert_eq!(row.values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_sparse_row_given_all_zero_or_empty_values_should_be_empty() {
        let zeros = sparse_row(vec![0.0; 4], None);
        assert!(zeros.indices.is_empty());
        assert!(zeros.values.is_empty());

        let empty = sparse_row(Vec::<f64>::new(), Some(&[]));
        assert!(empty.is_empty());
        assert_eq!(empty, SparseRow::default());
    }

    #[test]
    fn test_sparse_row_should_not_reorder_unsorted_indices() {
        let row = sparse_row(vec![1.0, 2.0], Some(&[4, 1]));
        assert_eq!(row.indices, vec![4, 1]);
    }

    #[test]
    fn test_sparse_row_should_allocate_exactly_the_non_zero_count() {
        let row = sparse_row([0.0, 1.0, 0.0, 2.0, 3.0], None);
        assert_eq!(row.indices.capacity(), 3);
        assert_eq!(row.values.capacity(), 3);
    }

    #[test]
    fn test_to_dense_given_row_should_invert_compression() {
        let row = SparseRow::from_pairs(&[(0, 1.0), (3, -1.0), (2, 0.0)]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.span(), 4);
        assert_eq!(row.to_dense(4), vec![1.0, 0.0, 0.0, -1.0]);
        assert_eq!(SparseRow::from_dense(&row.to_dense(4)), row);
    }
}
