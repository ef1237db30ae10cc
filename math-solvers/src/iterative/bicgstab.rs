//! BiCGSTAB (Bi-Conjugate Gradient Stabilized) solver
//!
//! BiCGSTAB is a Krylov subspace method for non-symmetric systems.
//! Panel-method influence matrices are dense and non-symmetric, and between
//! two consecutive time steps the solution changes little, so the solver
//! accepts an initial guess and a right preconditioner.

use crate::blas_helpers::{axpy, inner_product, vector_norm, xmay_inplace};
use crate::traits::{IdentityPreconditioner, LinearOperator, Preconditioner, RealField};
use ndarray::Array1;

/// BiCGSTAB solver configuration
#[derive(Debug, Clone)]
pub struct BiCgstabConfig<R> {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Relative tolerance for convergence
    pub tolerance: R,
    /// Print progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for BiCgstabConfig<f64> {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            print_interval: 0,
        }
    }
}

/// BiCGSTAB solver result
#[derive(Debug)]
pub struct BiCgstabSolution<T: RealField> {
    /// Solution vector
    pub x: Array1<T>,
    /// Number of iterations
    pub iterations: usize,
    /// Final relative residual
    pub residual: T,
    /// Whether convergence was achieved
    pub converged: bool,
}

/// Solve Ax = b using the BiCGSTAB method, starting from zero
pub fn bicgstab<T, A>(operator: &A, b: &Array1<T>, config: &BiCgstabConfig<T>) -> BiCgstabSolution<T>
where
    T: RealField,
    A: LinearOperator<T>,
{
    bicgstab_preconditioned_with_guess(operator, &IdentityPreconditioner, b, None, config)
}

/// Solve Ax = b using BiCGSTAB, starting from `x0`
pub fn bicgstab_with_guess<T, A>(
    operator: &A,
    b: &Array1<T>,
    x0: &Array1<T>,
    config: &BiCgstabConfig<T>,
) -> BiCgstabSolution<T>
where
    T: RealField,
    A: LinearOperator<T>,
{
    bicgstab_preconditioned_with_guess(operator, &IdentityPreconditioner, b, Some(x0), config)
}

/// Solve Ax = b using right-preconditioned BiCGSTAB with an optional initial guess
///
/// Convergence is declared when the true relative residual ||b - Ax|| / ||b||
/// drops below the configured tolerance, so a solution fed back as the next
/// guess for the same system is returned unchanged. A zero right-hand side
/// returns the zero vector immediately.
pub fn bicgstab_preconditioned_with_guess<T, A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<T>,
    x0: Option<&Array1<T>>,
    config: &BiCgstabConfig<T>,
) -> BiCgstabSolution<T>
where
    T: RealField,
    A: LinearOperator<T>,
    P: Preconditioner<T>,
{
    let n = b.len();
    let breakdown = T::from_f64_lossy(1e-30);

    let b_norm = vector_norm(b);
    if b_norm < T::from_f64_lossy(1e-15) {
        return BiCgstabSolution {
            x: Array1::from_elem(n, T::zero()),
            iterations: 0,
            residual: T::zero(),
            converged: true,
        };
    }

    let mut x = match x0 {
        Some(guess) if guess.len() == n => guess.clone(),
        _ => Array1::from_elem(n, T::zero()),
    };

    // Initial residual
    let mut r = b - &operator.apply(&x);
    let initial_residual = vector_norm(&r) / b_norm;
    if initial_residual < config.tolerance {
        return BiCgstabSolution {
            x,
            iterations: 0,
            residual: initial_residual,
            converged: true,
        };
    }
    let mut r0 = r.clone(); // Shadow residual

    let mut rho = T::one();
    let mut alpha = T::one();
    let mut omega = T::one();

    let mut p = Array1::from_elem(n, T::zero());
    let mut v = Array1::from_elem(n, T::zero());

    for iter in 0..config.max_iterations {
        let rho_new = inner_product(&r0, &r);

        // Check for breakdown
        if rho_new.abs() < breakdown {
            return BiCgstabSolution {
                x,
                iterations: iter,
                residual: vector_norm(&r) / b_norm,
                converged: false,
            };
        }

        let beta = (rho_new / rho) * (alpha / omega);
        rho = rho_new;

        // p = r + beta * (p - omega * v)
        axpy(-omega, &v, &mut p);
        xmay_inplace(&r, -beta, &mut p);

        // v = A * M * p
        let y = precond.apply(&p);
        v = operator.apply(&y);

        let r0v = inner_product(&r0, &v);
        if r0v.abs() < breakdown {
            return BiCgstabSolution {
                x,
                iterations: iter,
                residual: vector_norm(&r) / b_norm,
                converged: false,
            };
        }

        alpha = rho / r0v;

        // s = r - alpha * v
        let mut s = r.clone();
        axpy(-alpha, &v, &mut s);

        // Check for early convergence
        let s_norm = vector_norm(&s);
        if s_norm / b_norm < config.tolerance {
            axpy(alpha, &y, &mut x);
            r = b - &operator.apply(&x);
            let true_residual = vector_norm(&r) / b_norm;
            if true_residual < config.tolerance {
                return BiCgstabSolution {
                    x,
                    iterations: iter + 1,
                    residual: true_residual,
                    converged: true,
                };
            }
            restart(&r, &mut r0, &mut rho, &mut alpha, &mut omega, &mut p, &mut v);
            continue;
        }

        // t = A * M * s
        let z = precond.apply(&s);
        let t = operator.apply(&z);

        // omega = (t, s) / (t, t)
        let tt = inner_product(&t, &t);
        if tt.abs() < breakdown {
            return BiCgstabSolution {
                x,
                iterations: iter,
                residual: vector_norm(&r) / b_norm,
                converged: false,
            };
        }
        omega = inner_product(&t, &s) / tt;

        // x = x + alpha * y + omega * z
        axpy(alpha, &y, &mut x);
        axpy(omega, &z, &mut x);

        // r = s - omega * t
        r = s;
        axpy(-omega, &t, &mut r);

        let rel_residual = vector_norm(&r) / b_norm;

        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::info!(
                "BiCGSTAB iteration {}: relative residual = {:.6e}",
                iter + 1,
                rel_residual.to_f64().unwrap_or(0.0)
            );
        }

        if rel_residual < config.tolerance {
            // The recursive residual drifts from b - Ax; only the latter counts
            r = b - &operator.apply(&x);
            let true_residual = vector_norm(&r) / b_norm;
            if true_residual < config.tolerance {
                return BiCgstabSolution {
                    x,
                    iterations: iter + 1,
                    residual: true_residual,
                    converged: true,
                };
            }
            restart(&r, &mut r0, &mut rho, &mut alpha, &mut omega, &mut p, &mut v);
            continue;
        }

        // Check for stagnation
        if omega.abs() < breakdown {
            return BiCgstabSolution {
                x,
                iterations: iter + 1,
                residual: rel_residual,
                converged: false,
            };
        }
    }

    let rel_residual = vector_norm(&r) / b_norm;
    BiCgstabSolution {
        x,
        iterations: config.max_iterations,
        residual: rel_residual,
        converged: false,
    }
}

/// Restart the recurrences from the true residual `r`
fn restart<T: RealField>(
    r: &Array1<T>,
    r0: &mut Array1<T>,
    rho: &mut T,
    alpha: &mut T,
    omega: &mut T,
    p: &mut Array1<T>,
    v: &mut Array1<T>,
) {
    r0.assign(r);
    *rho = T::one();
    *alpha = T::one();
    *omega = T::one();
    p.fill(T::zero());
    v.fill(T::zero());
}
