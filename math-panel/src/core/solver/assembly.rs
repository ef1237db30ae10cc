//! Linear system for the doublet distribution
//!
//! With unit-strength kernels `D` (doublet) and `B` (source) evaluated at the
//! collocation points just inside the bodies, the interior disturbance
//! potential vanishes when
//!
//! ```text
//! Σ_j D_ij μ_j + Σ_j B_ij σ_j = 0
//! ```
//!
//! so the doublets solve `A μ = -S σ`. The unknown strength of each wake's
//! newest row is eliminated with the Kutta condition `μ_w = μ_upper − μ_lower`
//! by adding its influence to the upper trailing-edge column and subtracting
//! it from the lower one.

use ndarray::{Array1, Array2, ArrayView1};
use solvers::{
    BiCgstabConfig, BiCgstabSolution, DenseOperator, DiagonalPreconditioner,
    bicgstab_preconditioned_with_guess,
};

use super::index::SurfaceKind;
use super::{Solver, SolverError};
use crate::core::parallel::parallel_map_indexed;
use crate::core::types::Vector3D;

impl Solver {
    /// Neumann source strengths `σ = n · (v_kin − V∞ − v_wake) − v_blowing`
    ///
    /// The wake term only counts wake rows whose strength is already known,
    /// and only when wakes are convected.
    pub(super) fn compute_source_coefficients(&self, include_wake_influence: bool) -> Array1<f64> {
        let include_wake = include_wake_influence && self.parameters.convect_wake;
        let values = parallel_map_indexed(self.n_panels(), |i| {
            let (slot, panel) = self.index.locate(i);
            let body = &self.bodies[slot.body];
            let surface = self.slot_surface(slot);

            let mut velocity =
                body.panel_kinematic_velocity(surface, panel) - self.freestream_velocity;
            if include_wake {
                velocity -= self.assigned_wake_velocity(&surface.panel_collocation_point(panel));
            }

            velocity.dot(&surface.panel_normal(panel))
                - self.slot_boundary_layer(slot).blowing_velocity(panel)
        });
        Array1::from(values)
    }

    /// Doublet matrix (Kutta condition folded in) and source matrix
    pub(super) fn assemble_influence_matrices(&self) -> (Array2<f64>, Array2<f64>) {
        let n = self.n_panels();
        log::debug!("Computing {n}x{n} influence coefficient matrices");

        let rows = parallel_map_indexed(n, |i| self.influence_row(i));

        let mut doublet_matrix = Array2::zeros((n, n));
        let mut source_matrix = Array2::zeros((n, n));
        for (i, (doublet_row, source_row)) in rows.iter().enumerate() {
            doublet_matrix
                .row_mut(i)
                .assign(&ArrayView1::from(doublet_row.as_slice()));
            source_matrix
                .row_mut(i)
                .assign(&ArrayView1::from(source_row.as_slice()));
        }
        (doublet_matrix, source_matrix)
    }

    /// Row `i` of both matrices: influence of every panel on collocation point `i`
    fn influence_row(&self, i: usize) -> (Vec<f64>, Vec<f64>) {
        let n = self.n_panels();
        let (target_slot, target_panel) = self.index.locate(i);
        let target = self.slot_surface(target_slot);
        let x = target.panel_collocation_point(target_panel);

        let mut doublet_row = vec![0.0; n];
        let mut source_row = vec![0.0; n];
        for slot in self.index.slots() {
            let surface = self.slot_surface(slot);
            for panel in 0..slot.n_panels {
                let (source, doublet) =
                    surface.source_and_doublet_influence_on_panel(target, target_panel, panel);
                source_row[slot.offset + panel] = source;
                doublet_row[slot.offset + panel] = doublet;
            }

            let SurfaceKind::Lifting(k) = slot.kind else {
                continue;
            };
            let data = &self.bodies[slot.body].lifting_surfaces()[k];
            let (lifting, wake) = (data.lifting_surface(), data.wake());
            let Some(newest) = wake.newest_row_start() else {
                continue;
            };
            for j in 0..lifting.n_spanwise_panels() {
                let influence = wake.doublet_influence(&x, newest + j);
                doublet_row[slot.offset + lifting.trailing_edge_upper_panel(j)] += influence;
                doublet_row[slot.offset + lifting.trailing_edge_lower_panel(j)] -= influence;
            }
        }
        (doublet_row, source_row)
    }

    /// BiCGSTAB warm-started from the current doublets
    pub(super) fn solve_doublets(
        &self,
        operator: &DenseOperator<f64>,
        preconditioner: &DiagonalPreconditioner<f64>,
        rhs: &Array1<f64>,
    ) -> Result<BiCgstabSolution<f64>, SolverError> {
        let config = BiCgstabConfig {
            max_iterations: self.parameters.linear_solver_max_iterations,
            tolerance: self.parameters.linear_solver_tolerance,
            print_interval: 0,
        };
        let solution = bicgstab_preconditioned_with_guess(
            operator,
            preconditioner,
            rhs,
            Some(&self.doublet_coefficients),
            &config,
        );

        if !solution.converged {
            return Err(SolverError::LinearSolveFailed {
                iterations: solution.iterations,
                residual: solution.residual,
            });
        }
        log::info!(
            "Computed doublet distribution in {} iterations (relative residual {:.3e})",
            solution.iterations,
            solution.residual
        );
        Ok(solution)
    }

    /// Give each wake's newest row the trailing-edge doublet jump
    pub(super) fn apply_kutta_condition(&mut self) {
        for slot in self.index.slots() {
            let SurfaceKind::Lifting(k) = slot.kind else {
                continue;
            };
            let data = &mut self.bodies[slot.body].lifting_surfaces_mut()[k];
            let jumps: Vec<f64> = {
                let lifting = data.lifting_surface();
                (0..lifting.n_spanwise_panels())
                    .map(|j| {
                        self.doublet_coefficients[slot.offset + lifting.trailing_edge_upper_panel(j)]
                            - self.doublet_coefficients
                                [slot.offset + lifting.trailing_edge_lower_panel(j)]
                    })
                    .collect()
            };
            let wake = data.wake_mut();
            for (j, jump) in jumps.into_iter().enumerate() {
                wake.set_newest_row_doublet(j, jump);
            }
        }
    }

    /// Tangential flow velocity relative to each panel
    pub(super) fn compute_surface_velocities(&self) -> Array2<f64> {
        let velocities = parallel_map_indexed(self.n_panels(), |i| self.surface_velocity_of(i));
        Array2::from_shape_fn((velocities.len(), 3), |(i, c)| velocities[i].to_array()[c])
    }

    fn surface_velocity_of(&self, i: usize) -> Vector3D {
        let (slot, panel) = self.index.locate(i);
        let body = &self.bodies[slot.body];
        let surface = self.slot_surface(slot);
        let x = surface.panel_collocation_point(panel);
        let gradient =
            surface.scalar_field_gradient(self.doublet_coefficients.view(), slot.offset, panel);

        let disturbance = if self.parameters.marcov_surface_velocity {
            self.disturbance_velocity(&x) - gradient * 0.5
        } else {
            -gradient
        };
        let apparent = body.panel_kinematic_velocity(surface, panel) - self.freestream_velocity;

        // Tangential part only
        (disturbance - apparent).reject(&surface.panel_normal(panel))
    }
}
