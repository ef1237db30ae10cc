//! Unsteady potential-flow panel solver
//!
//! The solver owns the registered bodies and one global vector per panel
//! quantity (doublet and source strengths, surface potentials, surface
//! velocities, pressure coefficients), indexed by one flat panel numbering
//! fixed at registration. A time step is driven by the caller:
//!
//! ```ignore
//! let mut solver = Solver::new("vtk").with_parameters(SolverParameters::default());
//! let id = solver.add_body(body);
//! solver.set_freestream_velocity(Vector3D::new(30.0, 0.0, 0.0));
//! solver.initialize_wakes(dt);
//! for step in 0..n_steps {
//!     solver.solve(dt, true)?;
//!     solver.update_wakes(dt);
//!     solver.log(step, &mut JsonSurfaceWriter)?;
//! }
//! let lift = solver.force(id).z;
//! ```
//!
//! ## Architecture
//!
//! - `index`: flat panel numbering and surface offset table
//! - `assembly`: source terms, influence matrices, Kutta folding, linear solve
//! - `field`: potential and velocity anywhere in the flow
//! - `loads`: surface potentials, pressure coefficients, forces and moments
//! - `wakes`: wake shedding and convection
//! - `logging`: per-step surface output

mod assembly;
mod field;
mod index;
mod loads;
mod logging;
mod wakes;

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};
use solvers::{DenseOperator, DiagonalPreconditioner};

use crate::core::body::{Body, LiftingSurfaceData};
use crate::core::boundary_layer::BoundaryLayer;
use crate::core::constants::DEFAULT_FLUID_DENSITY;
use crate::core::io::WriterError;
use crate::core::mesh::{Surface, SurfaceId};
use crate::core::parameters::SolverParameters;
use crate::core::types::Vector3D;

use index::{PanelIndex, SurfaceKind, SurfaceSlot};

/// Handle of a body registered with a [`Solver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(usize);

impl BodyId {
    /// Registration order of the body
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body-{}", self.0)
    }
}

/// Outcome of the boundary-layer coupling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryLayerStatus {
    /// Every boundary layer is passive; one inviscid pass was made
    Passive,
    /// The doublet change dropped below tolerance
    Converged {
        /// Inviscid passes made
        iterations: usize,
    },
    /// The iteration cap was hit; the last state was kept
    IterationLimit {
        /// Inviscid passes made
        iterations: usize,
    },
}

/// Summary of one successful [`Solver::solve`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Boundary-layer coupling outcome
    pub boundary_layer_status: BoundaryLayerStatus,
    /// Linear solver iterations of the last pass
    pub linear_iterations: usize,
    /// Relative residual of the last linear solve
    pub linear_residual: f64,
}

/// Solver errors
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// The doublet system did not reach tolerance within the iteration budget
    #[error("linear solver failed after {iterations} iterations (relative residual {residual:e})")]
    LinearSolveFailed {
        /// Iterations performed
        iterations: usize,
        /// Relative residual reached
        residual: f64,
    },

    /// IO error while logging
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Surface writer failure
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),

    /// No body registered under this handle
    #[error("unknown body {0}")]
    UnknownBody(BodyId),
}

/// Coefficients saved before a step so a failed solve leaves no trace
struct Snapshot {
    doublet_coefficients: Array1<f64>,
    source_coefficients: Array1<f64>,
    surface_velocity_potentials: Array1<f64>,
    surface_velocities: Array2<f64>,
    pressure_coefficients: Array1<f64>,
    newest_wake_doublets: Vec<Vec<f64>>,
}

/// Unsteady panel-method solver
#[derive(Debug)]
pub struct Solver {
    log_folder: PathBuf,
    parameters: SolverParameters,
    freestream_velocity: Vector3D,
    fluid_density: f64,
    bodies: Vec<Body>,
    index: PanelIndex,
    doublet_coefficients: Array1<f64>,
    source_coefficients: Array1<f64>,
    surface_velocity_potentials: Array1<f64>,
    previous_surface_velocity_potentials: Array1<f64>,
    surface_velocities: Array2<f64>,
    pressure_coefficients: Array1<f64>,
}

impl Solver {
    /// Solver writing its logs under `log_folder`, with default parameters,
    /// no freestream and standard air density
    pub fn new(log_folder: impl Into<PathBuf>) -> Self {
        Self {
            log_folder: log_folder.into(),
            parameters: SolverParameters::default(),
            freestream_velocity: Vector3D::zero(),
            fluid_density: DEFAULT_FLUID_DENSITY,
            bodies: Vec::new(),
            index: PanelIndex::default(),
            doublet_coefficients: Array1::zeros(0),
            source_coefficients: Array1::zeros(0),
            surface_velocity_potentials: Array1::zeros(0),
            previous_surface_velocity_potentials: Array1::zeros(0),
            surface_velocities: Array2::zeros((0, 3)),
            pressure_coefficients: Array1::zeros(0),
        }
    }

    /// Replace the solver parameters
    pub fn with_parameters(mut self, parameters: SolverParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Swap the parameters between steps
    pub fn set_parameters(&mut self, parameters: SolverParameters) {
        self.parameters = parameters;
    }

    /// Current parameters
    pub fn parameters(&self) -> &SolverParameters {
        &self.parameters
    }

    /// Output folder of [`Solver::log`]
    pub fn log_folder(&self) -> &Path {
        &self.log_folder
    }

    /// Set the uniform freestream velocity
    pub fn set_freestream_velocity(&mut self, velocity: Vector3D) {
        self.freestream_velocity = velocity;
    }

    /// Uniform freestream velocity
    pub fn freestream_velocity(&self) -> Vector3D {
        self.freestream_velocity
    }

    /// Set the fluid density used for loads
    pub fn set_fluid_density(&mut self, density: f64) {
        self.fluid_density = density;
    }

    /// Fluid density used for loads
    pub fn fluid_density(&self) -> f64 {
        self.fluid_density
    }

    /// Register a body
    ///
    /// Its panels are numbered after every panel registered so far. Existing
    /// coefficients are kept; the new entries start at zero.
    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.bodies.len());
        self.index.register(id.0, &body);
        log::info!(
            "Registered body '{}' ({} non-lifting, {} lifting surfaces), {} panels in total",
            body.id(),
            body.non_lifting_surfaces().len(),
            body.lifting_surfaces().len(),
            self.index.n_panels()
        );
        self.bodies.push(body);

        let n = self.index.n_panels();
        self.doublet_coefficients = grown(&self.doublet_coefficients, n);
        self.source_coefficients = grown(&self.source_coefficients, n);
        self.surface_velocity_potentials = grown(&self.surface_velocity_potentials, n);
        self.previous_surface_velocity_potentials =
            grown(&self.previous_surface_velocity_potentials, n);
        self.pressure_coefficients = grown(&self.pressure_coefficients, n);
        let mut velocities = Array2::zeros((n, 3));
        let old = self.surface_velocities.nrows();
        velocities
            .slice_mut(s![..old, ..])
            .assign(&self.surface_velocities);
        self.surface_velocities = velocities;
        id
    }

    /// Registered bodies in registration order
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Registered body
    pub fn body(&self, id: BodyId) -> Result<&Body, SolverError> {
        self.bodies.get(id.0).ok_or(SolverError::UnknownBody(id))
    }

    /// Registered body, for driving its kinematics between steps
    pub fn body_mut(&mut self, id: BodyId) -> Result<&mut Body, SolverError> {
        self.bodies.get_mut(id.0).ok_or(SolverError::UnknownBody(id))
    }

    /// Total number of non-wake panels
    pub fn n_panels(&self) -> usize {
        self.index.n_panels()
    }

    /// Block of the global numbering owned by a surface
    pub fn panel_range(&self, surface: SurfaceId) -> Option<Range<usize>> {
        self.index.slot(surface).map(SurfaceSlot::range)
    }

    /// Doublet strengths of all non-wake panels
    pub fn doublet_coefficients(&self) -> ArrayView1<'_, f64> {
        self.doublet_coefficients.view()
    }

    /// Source strengths of all non-wake panels
    pub fn source_coefficients(&self) -> ArrayView1<'_, f64> {
        self.source_coefficients.view()
    }

    /// Surface velocity potentials of all non-wake panels
    pub fn surface_velocity_potentials(&self) -> ArrayView1<'_, f64> {
        self.surface_velocity_potentials.view()
    }

    /// Surface velocities, one row per panel
    pub fn surface_velocities(&self) -> ArrayView2<'_, f64> {
        self.surface_velocities.view()
    }

    /// Pressure coefficients of all non-wake panels
    pub fn pressure_coefficients(&self) -> ArrayView1<'_, f64> {
        self.pressure_coefficients.view()
    }

    /// Surface velocity potential of one panel (0 if the panel is unknown)
    pub fn surface_velocity_potential(&self, surface: SurfaceId, panel: usize) -> f64 {
        self.lookup(surface, panel, "surface_velocity_potential")
            .map_or(0.0, |i| self.surface_velocity_potentials[i])
    }

    /// Surface velocity of one panel (zero if the panel is unknown)
    pub fn surface_velocity(&self, surface: SurfaceId, panel: usize) -> Vector3D {
        self.lookup(surface, panel, "surface_velocity")
            .map_or(Vector3D::zero(), |i| self.surface_velocity_row(i))
    }

    /// Pressure coefficient of one panel (0 if the panel is unknown)
    pub fn pressure_coefficient(&self, surface: SurfaceId, panel: usize) -> f64 {
        self.lookup(surface, panel, "pressure_coefficient")
            .map_or(0.0, |i| self.pressure_coefficients[i])
    }

    /// Compute source, doublet and pressure distributions for the current
    /// body positions and wakes
    ///
    /// With `propagate` the new surface potentials become the reference for
    /// the next step's time derivative. On error every coefficient, including
    /// the newest wake doublets, is left as it was before the call.
    pub fn solve(&mut self, dt: f64, propagate: bool) -> Result<SolveReport, SolverError> {
        let snapshot = self.snapshot();
        match self.run_step(dt) {
            Ok(report) => {
                if propagate {
                    self.propagate();
                }
                Ok(report)
            }
            Err(err) => {
                log::error!("Solve failed, restoring previous state: {err}");
                self.restore(snapshot);
                Err(err)
            }
        }
    }

    /// Store the current surface potentials as the previous time level
    pub fn propagate(&mut self) {
        self.previous_surface_velocity_potentials
            .assign(&self.surface_velocity_potentials);
    }

    fn run_step(&mut self, dt: f64) -> Result<SolveReport, SolverError> {
        log::info!(
            "Solving {} panels on {} bodies (dt = {dt})",
            self.n_panels(),
            self.bodies.len()
        );

        // Geometry and wakes are frozen during a step, so the matrices are
        // assembled once for all boundary-layer passes.
        let (doublet_matrix, source_matrix) = self.assemble_influence_matrices();
        let operator = DenseOperator::new(doublet_matrix);
        let preconditioner = DiagonalPreconditioner::from_dense(&operator);

        let mut iteration = 0;
        let (status, linear_iterations, linear_residual) = loop {
            log::debug!("Computing source distribution with wake influence");
            self.source_coefficients = self.compute_source_coefficients(true);

            let rhs = -source_matrix.dot(&self.source_coefficients);
            let solution = self.solve_doublets(&operator, &preconditioner, &rhs)?;

            let converged = iteration > 0
                && (&solution.x - &self.doublet_coefficients)
                    .mapv(|d| d * d)
                    .sum()
                    .sqrt()
                    < self.parameters.boundary_layer_iteration_tolerance;

            self.doublet_coefficients = solution.x;
            self.apply_kutta_condition();
            self.surface_velocities = self.compute_surface_velocities();

            if converged {
                log::info!("Boundary layer iteration converged after {} passes", iteration + 1);
                let status = BoundaryLayerStatus::Converged {
                    iterations: iteration + 1,
                };
                break (status, solution.iterations, solution.residual);
            }

            if iteration > self.parameters.max_boundary_layer_iterations {
                log::warn!(
                    "Maximum number of boundary layer iterations ({}) reached, keeping last state",
                    self.parameters.max_boundary_layer_iterations
                );
                let status = BoundaryLayerStatus::IterationLimit {
                    iterations: iteration + 1,
                };
                break (status, solution.iterations, solution.residual);
            }

            if !self.recalculate_boundary_layers() {
                break (
                    BoundaryLayerStatus::Passive,
                    solution.iterations,
                    solution.residual,
                );
            }

            iteration += 1;
        };

        if self.parameters.convect_wake {
            log::debug!("Recomputing source distribution without wake influence");
            self.source_coefficients = self.compute_source_coefficients(false);
        }

        self.compute_pressures(dt);

        Ok(SolveReport {
            boundary_layer_status: status,
            linear_iterations,
            linear_residual,
        })
    }

    /// Feed the latest surface velocities to every active boundary layer
    ///
    /// Returns whether any active layer exists.
    fn recalculate_boundary_layers(&mut self) -> bool {
        let mut active = false;
        for slot in self.index.slots() {
            let velocities = self.surface_velocities.slice(s![slot.range(), ..]);
            let body = &mut self.bodies[slot.body];
            let layer = match slot.kind {
                SurfaceKind::NonLifting(k) => body.non_lifting_surfaces_mut()[k].boundary_layer_mut(),
                SurfaceKind::Lifting(k) => body.lifting_surfaces_mut()[k].boundary_layer_mut(),
            };
            if !layer.is_passive() {
                active = true;
                layer.recalculate(velocities);
            }
        }
        active
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            doublet_coefficients: self.doublet_coefficients.clone(),
            source_coefficients: self.source_coefficients.clone(),
            surface_velocity_potentials: self.surface_velocity_potentials.clone(),
            surface_velocities: self.surface_velocities.clone(),
            pressure_coefficients: self.pressure_coefficients.clone(),
            newest_wake_doublets: self
                .lifting_surfaces()
                .map(|(_, data)| data.wake().newest_row_doublets().to_vec())
                .collect(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.doublet_coefficients = snapshot.doublet_coefficients;
        self.source_coefficients = snapshot.source_coefficients;
        self.surface_velocity_potentials = snapshot.surface_velocity_potentials;
        self.surface_velocities = snapshot.surface_velocities;
        self.pressure_coefficients = snapshot.pressure_coefficients;

        let wakes = self
            .bodies
            .iter_mut()
            .flat_map(|body| body.lifting_surfaces_mut().iter_mut())
            .map(LiftingSurfaceData::wake_mut);
        for (wake, row) in wakes.zip(&snapshot.newest_wake_doublets) {
            wake.restore_newest_row_doublets(row);
        }
    }

    fn lookup(&self, surface: SurfaceId, panel: usize, caller: &str) -> Option<usize> {
        let index = self.index.global(surface, panel);
        if index.is_none() {
            log::warn!("Solver::{caller}(): panel {panel} not found on {surface}");
        }
        index
    }

    fn slot_surface(&self, slot: &SurfaceSlot) -> &Surface {
        let body = &self.bodies[slot.body];
        match slot.kind {
            SurfaceKind::NonLifting(k) => body.non_lifting_surfaces()[k].surface(),
            SurfaceKind::Lifting(k) => body.lifting_surfaces()[k].surface(),
        }
    }

    fn slot_boundary_layer(&self, slot: &SurfaceSlot) -> &dyn BoundaryLayer {
        let body = &self.bodies[slot.body];
        match slot.kind {
            SurfaceKind::NonLifting(k) => body.non_lifting_surfaces()[k].boundary_layer(),
            SurfaceKind::Lifting(k) => body.lifting_surfaces()[k].boundary_layer(),
        }
    }

    /// Every lifting surface with its owning body, in registration order
    fn lifting_surfaces(&self) -> impl Iterator<Item = (&Body, &LiftingSurfaceData)> {
        self.bodies
            .iter()
            .flat_map(|body| body.lifting_surfaces().iter().map(move |data| (body, data)))
    }

    fn surface_velocity_row(&self, panel: usize) -> Vector3D {
        let row = self.surface_velocities.row(panel);
        Vector3D::new(row[0], row[1], row[2])
    }
}

/// Copy of `values` extended with zeros to length `n`
fn grown(values: &Array1<f64>, n: usize) -> Array1<f64> {
    let mut out = Array1::zeros(n);
    out.slice_mut(s![..values.len()]).assign(values);
    out
}
