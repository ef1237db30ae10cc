//! Diagonal (Jacobi) preconditioner
//!
//! Simple but effective preconditioner that scales by the diagonal of A.
//! Influence matrices carry the ±½ self-influence on the diagonal, so this
//! is usually enough to keep BiCGSTAB iteration counts low.

use crate::dense::DenseOperator;
use crate::traits::{Preconditioner, RealField};
use ndarray::Array1;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Diagonal (Jacobi) preconditioner
///
/// M = diag(A)^(-1), so M scales each component by 1/A_ii
#[derive(Debug, Clone)]
pub struct DiagonalPreconditioner<T: RealField> {
    /// Inverse diagonal elements
    inv_diag: Array1<T>,
}

impl<T: RealField> DiagonalPreconditioner<T> {
    /// Create a diagonal preconditioner from a dense operator
    pub fn from_dense(operator: &DenseOperator<T>) -> Self {
        Self::from_diagonal(&operator.diagonal())
    }

    /// Create from a diagonal vector directly
    ///
    /// Near-zero entries are replaced by one so the preconditioner stays finite.
    pub fn from_diagonal(diag: &Array1<T>) -> Self {
        let threshold = T::from_f64_lossy(1e-30);
        let inv_diag = diag.mapv(|d| {
            if d.abs() > threshold {
                T::one() / d
            } else {
                T::one()
            }
        });
        Self { inv_diag }
    }
}

impl<T: RealField> Preconditioner<T> for DiagonalPreconditioner<T> {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        #[cfg(feature = "rayon")]
        {
            if r.len() >= 1000 {
                return self.apply_parallel(r);
            }
        }
        self.apply_sequential(r)
    }
}

impl<T: RealField> DiagonalPreconditioner<T> {
    fn apply_sequential(&self, r: &Array1<T>) -> Array1<T> {
        r.iter()
            .zip(self.inv_diag.iter())
            .map(|(&ri, &di)| ri * di)
            .collect()
    }

    #[cfg(feature = "rayon")]
    fn apply_parallel(&self, r: &Array1<T>) -> Array1<T> {
        let r_vec: Vec<T> = r.to_vec();
        let inv_vec: Vec<T> = self.inv_diag.to_vec();
        let results: Vec<T> = r_vec
            .par_iter()
            .zip(inv_vec.par_iter())
            .map(|(&ri, &di)| ri * di)
            .collect();
        Array1::from_vec(results)
    }
}
