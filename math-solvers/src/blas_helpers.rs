//! Vector kernels shared by the Krylov solvers
//!
//! Plain Rust loops over contiguous `ndarray` storage; the dense mat-vec
//! dominates the cost of a panel solve, so these stay sequential.

use crate::traits::RealField;
use ndarray::Array1;

/// Compute inner product (x, y) = Σ x_i * y_i
#[inline]
pub fn inner_product<T: RealField>(x: &Array1<T>, y: &Array1<T>) -> T {
    assert_eq!(
        x.len(),
        y.len(),
        "Vector lengths must match for inner product"
    );
    let mut sum = T::zero();
    for (xi, yi) in x.iter().zip(y.iter()) {
        sum += *xi * *yi;
    }
    sum
}

/// Compute vector 2-norm: ||x||_2 = sqrt(Σ x_i^2)
#[inline]
pub fn vector_norm<T: RealField>(x: &Array1<T>) -> T {
    vector_norm_sqr(x).sqrt()
}

/// Compute vector norm squared: ||x||_2^2 = Σ x_i^2
#[inline]
pub fn vector_norm_sqr<T: RealField>(x: &Array1<T>) -> T {
    let mut sum = T::zero();
    for xi in x.iter() {
        sum += *xi * *xi;
    }
    sum
}

/// Compute axpy: y = α * x + y
#[inline]
pub fn axpy<T: RealField>(alpha: T, x: &Array1<T>, y: &mut Array1<T>) {
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        *yi += alpha * *xi;
    }
}

/// Compute the scaled vector difference in place: y = x - α * y
#[inline]
pub fn xmay_inplace<T: RealField>(x: &Array1<T>, alpha: T, y: &mut Array1<T>) {
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        *yi = *xi - alpha * *yi;
    }
}
