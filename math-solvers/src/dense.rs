//! Dense matrix operator
//!
//! Panel-method influence matrices couple every panel with every other panel,
//! so the system is stored as a full row-major `Array2`. Rows are independent,
//! which makes the mat-vec a straightforward parallel map.

use crate::traits::{LinearOperator, RealField};
use ndarray::{Array1, Array2};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Row count above which the mat-vec is split across the rayon pool
const PARALLEL_ROW_THRESHOLD: usize = 256;

/// Dense matrix wrapped as a [`LinearOperator`]
#[derive(Debug, Clone)]
pub struct DenseOperator<T: RealField> {
    matrix: Array2<T>,
}

impl<T: RealField> DenseOperator<T> {
    /// Wrap an assembled matrix
    pub fn new(matrix: Array2<T>) -> Self {
        Self { matrix }
    }

    /// Borrow the underlying matrix
    pub fn matrix(&self) -> &Array2<T> {
        &self.matrix
    }

    /// Extract the main diagonal
    pub fn diagonal(&self) -> Array1<T> {
        self.matrix.diag().to_owned()
    }

    /// Consume the operator and return the matrix
    pub fn into_inner(self) -> Array2<T> {
        self.matrix
    }

    fn row_dot(&self, i: usize, x: &Array1<T>) -> T {
        let mut sum = T::zero();
        for (aij, xj) in self.matrix.row(i).iter().zip(x.iter()) {
            sum += *aij * *xj;
        }
        sum
    }

    fn apply_sequential(&self, x: &Array1<T>) -> Array1<T> {
        (0..self.matrix.nrows())
            .map(|i| self.row_dot(i, x))
            .collect()
    }

    #[cfg(feature = "rayon")]
    fn apply_parallel(&self, x: &Array1<T>) -> Array1<T> {
        let values: Vec<T> = (0..self.matrix.nrows())
            .into_par_iter()
            .map(|i| self.row_dot(i, x))
            .collect();
        Array1::from_vec(values)
    }
}

impl<T: RealField> LinearOperator<T> for DenseOperator<T> {
    fn num_rows(&self) -> usize {
        self.matrix.nrows()
    }

    fn num_cols(&self) -> usize {
        self.matrix.ncols()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols(), "Operand length must match columns");
        #[cfg(feature = "rayon")]
        {
            if self.num_rows() >= PARALLEL_ROW_THRESHOLD {
                return self.apply_parallel(x);
            }
        }
        self.apply_sequential(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_rows(), "Operand length must match rows");
        let mut y = Array1::from_elem(self.num_cols(), T::zero());
        for (row, xi) in self.matrix.rows().into_iter().zip(x.iter()) {
            for (yj, aij) in y.iter_mut().zip(row.iter()) {
                *yj += *aij * *xi;
            }
        }
        y
    }
}
