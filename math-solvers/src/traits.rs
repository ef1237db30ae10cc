//! Core traits for linear algebra operations
//!
//! This module defines the fundamental abstractions used throughout the solver library:
//! - [`RealField`]: Trait for the real scalar types the solvers operate on
//! - [`LinearOperator`]: Trait for matrix-like objects that can perform matrix-vector products
//! - [`Preconditioner`]: Trait for preconditioning operations

use ndarray::Array1;
use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};
use std::fmt::Debug;

/// Trait for scalar types that can be used in the solvers.
///
/// Panel-method influence matrices are real, so this is a thin alias over
/// [`Float`] with the conversions and thread-safety bounds the Krylov
/// loops need. Implemented for `f64` and `f32` through a blanket impl.
pub trait RealField:
    Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static
{
    /// Convert an `f64` constant into this type.
    ///
    /// Values that cannot be represented collapse to zero.
    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::zero)
    }

    /// Check if this is approximately zero
    #[inline]
    fn is_zero_approx(&self, tol: Self) -> bool {
        self.abs() < tol
    }
}

impl<T> RealField for T where
    T: Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static
{
}

/// Trait for linear operators (matrices) that can compute matrix-vector products.
///
/// Iterative solvers only ever touch the system through this trait, so a dense
/// influence matrix and a matrix-free evaluation are interchangeable.
pub trait LinearOperator<T: RealField>: Send + Sync {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<T>) -> Array1<T>;

    /// Apply the transpose: y = A^T * x
    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T>;

    /// Check if the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}

/// Trait for preconditioners used in iterative solvers.
///
/// A preconditioner M approximates A^(-1), so that A*M is better conditioned
/// than A alone. This accelerates convergence of iterative methods.
pub trait Preconditioner<T: RealField>: Send + Sync {
    /// Apply the preconditioner: y = M * r
    ///
    /// This should approximate solving A * y = r
    fn apply(&self, r: &Array1<T>) -> Array1<T>;
}

/// Identity preconditioner (no preconditioning)
#[derive(Clone, Debug, Default)]
pub struct IdentityPreconditioner;

impl<T: RealField> Preconditioner<T> for IdentityPreconditioner {
    fn apply(&self, r: &Array1<T>) -> Array1<T> {
        r.clone()
    }
}
