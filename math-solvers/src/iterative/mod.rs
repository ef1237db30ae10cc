//! Iterative solvers for linear systems
//!
//! - [`bicgstab`]: BiCGSTAB from a zero initial guess
//! - [`bicgstab_with_guess`]: BiCGSTAB warm-started from a previous solution
//! - [`bicgstab_preconditioned_with_guess`]: right-preconditioned variant used by the panel solver

mod bicgstab;

pub use bicgstab::{
    BiCgstabConfig, BiCgstabSolution, bicgstab, bicgstab_preconditioned_with_guess,
    bicgstab_with_guess,
};
