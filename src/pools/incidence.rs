use crate::errors::ConfigError;
use crate::program::builder::check_length;
use serde::{Deserialize, Serialize};

/// Local-to-global incidence matrix of one pool.
///
/// Logically an `n x arity` 0/1 matrix with exactly one 1 per column, stored as
/// the row index of that 1 for each column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidenceMatrix {
    rows: usize,
    column_rows: Vec<usize>,
}

impl IncidenceMatrix {
    pub fn new(rows: usize, local_indices: &[usize]) -> Result<Self, ConfigError> {
        if let Some(&index) = local_indices.iter().find(|&&index| index >= rows) {
            return Err(ConfigError::IndexOutOfRange { pool: 0, index, tokens: rows });
        }
        Ok(Self { rows, column_rows: local_indices.to_vec() })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.column_rows.len()
    }

    /// Global row of the single nonzero entry in `col`.
    pub fn row_of(&self, col: usize) -> Option<usize> {
        self.column_rows.get(col).copied()
    }

    /// Global row of every column, in column order.
    pub fn column_rows(&self) -> &[usize] {
        &self.column_rows
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        if self.column_rows.get(col) == Some(&row) { 1.0 } else { 0.0 }
    }

    /// Rows holding a nonzero entry in `col`. Always exactly one.
    pub fn column_nonzeros(&self, col: usize) -> Vec<(usize, f64)> {
        (0..self.rows).map(|row| (row, self.get(row, col))).filter(|(_, value)| *value != 0.0).collect()
    }

    /// `A · local`: scatter pool-local amounts into the global token space.
    pub fn scatter(&self, local: &[f64]) -> Result<Vec<f64>, ConfigError> {
        check_length("local", local, self.ncols())?;
        let mut global = vec![0.0; self.rows];
        for (&row, amount) in self.column_rows.iter().zip(local) {
            global[row] += amount;
        }
        Ok(global)
    }

    /// `Aᵀ · global`: slice a global vector down to the pool's local coordinates.
    pub fn gather(&self, global: &[f64]) -> Result<Vec<f64>, ConfigError> {
        check_length("global", global, self.rows)?;
        Ok(self.column_rows.iter().map(|&row| global[row]).collect())
    }

    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|row| (0..self.ncols()).map(|col| self.get(row, col)).collect()).collect()
    }
}

/// Build one incidence matrix per pool over a token space of size `n`.
pub fn build_incidence(n: usize, local_indices: &[Vec<usize>]) -> Result<Vec<IncidenceMatrix>, ConfigError> {
    local_indices
        .iter()
        .enumerate()
        .map(|(pool, indices)| IncidenceMatrix::new(n, indices).map_err(|err| err.at_pool(pool)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_column_has_single_unit_entry() -> eyre::Result<()> {
        let local_indices = vec![vec![0, 1, 2, 3], vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 2]];
        let matrices = build_incidence(4, &local_indices)?;

        assert_eq!(matrices.len(), 5);
        for (matrix, indices) in matrices.iter().zip(&local_indices) {
            assert_eq!(matrix.nrows(), 4);
            assert_eq!(matrix.ncols(), indices.len());
            for (col, &index) in indices.iter().enumerate() {
                assert_eq!(matrix.column_nonzeros(col), vec![(index, 1.0)]);
            }
        }
        Ok(())
    }

    #[test]
    fn test_dense_layout() -> eyre::Result<()> {
        let matrix = IncidenceMatrix::new(3, &[2, 0])?;
        assert_eq!(matrix.to_dense(), vec![vec![0.0, 1.0], vec![0.0, 0.0], vec![1.0, 0.0]]);
        Ok(())
    }

    #[test]
    fn test_scatter_and_gather() -> eyre::Result<()> {
        let matrix = IncidenceMatrix::new(4, &[3, 1])?;

        assert_eq!(matrix.scatter(&[2.0, 5.0])?, vec![0.0, 5.0, 0.0, 2.0]);
        assert_eq!(matrix.gather(&[1.5, 10.0, 2.0, 3.0])?, vec![3.0, 10.0]);
        assert_eq!(matrix.column_rows(), &[3, 1]);
        Ok(())
    }

    #[test]
    fn test_wrong_length_is_rejected() -> eyre::Result<()> {
        let matrix = IncidenceMatrix::new(4, &[3, 1])?;

        assert_eq!(matrix.scatter(&[1.0, 2.0, 3.0]), Err(ConfigError::VectorLength { name: "local", expected: 2, actual: 3 }));
        assert_eq!(matrix.scatter(&[1.0]), Err(ConfigError::VectorLength { name: "local", expected: 2, actual: 1 }));
        assert_eq!(matrix.gather(&[1.0, 2.0]), Err(ConfigError::VectorLength { name: "global", expected: 4, actual: 2 }));
        assert_eq!(matrix.row_of(1), Some(1));
        assert_eq!(matrix.row_of(2), None);
        Ok(())
    }

    #[test]
    fn test_index_out_of_range() {
        let err = build_incidence(2, &[vec![0, 1], vec![1, 2]]).unwrap_err();
        assert_eq!(err, ConfigError::IndexOutOfRange { pool: 1, index: 2, tokens: 2 });
    }
}
