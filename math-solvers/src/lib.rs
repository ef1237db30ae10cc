//! Linear solvers for dense panel-method systems
//!
//! This crate provides the Krylov machinery behind the panel solver: a dense
//! matrix operator, a Jacobi preconditioner and a warm-startable BiCGSTAB.
//!
//! # Features
//!
//! - **Iterative Solvers**: BiCGSTAB with optional initial guess and right preconditioning
//! - **Preconditioners**: Jacobi, identity
//! - **Dense Operators**: row-parallel matrix-vector products (`rayon` feature)
//! - **Generic Scalar Types**: Works with f64 and f32
//!
//! # Example
//!
//! ```
//! use math_aero_solvers::{
//!     BiCgstabConfig, DenseOperator, DiagonalPreconditioner, bicgstab_preconditioned_with_guess,
//! };
//! use ndarray::array;
//!
//! let operator = DenseOperator::new(array![[4.0, 1.0], [1.0, 3.0]]);
//! let precond = DiagonalPreconditioner::from_dense(&operator);
//! let rhs = array![1.0, 2.0];
//!
//! let config = BiCgstabConfig { max_iterations: 50, tolerance: 1e-12, print_interval: 0 };
//! let solution = bicgstab_preconditioned_with_guess(&operator, &precond, &rhs, None, &config);
//! assert!(solution.converged);
//! ```

pub mod blas_helpers;
pub mod dense;
pub mod iterative;
pub mod preconditioners;
pub mod traits;

// Re-export main types
pub use dense::DenseOperator;
pub use traits::{LinearOperator, Preconditioner, RealField};

// Re-export iterative solvers
pub use iterative::{
    BiCgstabConfig, BiCgstabSolution, bicgstab, bicgstab_preconditioned_with_guess,
    bicgstab_with_guess,
};

// Re-export preconditioners
pub use preconditioners::{DiagonalPreconditioner, IdentityPreconditioner};
