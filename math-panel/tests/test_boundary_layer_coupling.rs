//! Viscous/inviscid coupling tests
//!
//! Boundary layers here are small stand-ins: one that converges, one that
//! never settles, one that only adds friction.

use approx::assert_relative_eq;
use math_aero_panel::core::mesh::sphere;
use math_aero_panel::{
    Body, BodyId, BoundaryLayer, BoundaryLayerStatus, DummyBoundaryLayer, Solver,
    SolverParameters, Vector3D,
};
use ndarray::ArrayView2;

/// Blowing proportional to the local surface speed
#[derive(Debug)]
struct ProportionalBlowing {
    gain: f64,
    blowing: Vec<f64>,
}

impl BoundaryLayer for ProportionalBlowing {
    fn recalculate(&mut self, surface_velocities: ArrayView2<'_, f64>) {
        self.blowing = surface_velocities
            .rows()
            .into_iter()
            .map(|v| self.gain * v.dot(&v).sqrt())
            .collect();
    }

    fn blowing_velocity(&self, panel: usize) -> f64 {
        self.blowing.get(panel).copied().unwrap_or(0.0)
    }

    fn friction(&self, _panel: usize) -> Vector3D {
        Vector3D::zero()
    }
}

/// Blowing that flips on and off at every pass
#[derive(Debug, Default)]
struct OscillatingBlowing {
    on: bool,
}

impl BoundaryLayer for OscillatingBlowing {
    fn recalculate(&mut self, _surface_velocities: ArrayView2<'_, f64>) {
        self.on = !self.on;
    }

    fn blowing_velocity(&self, _panel: usize) -> f64 {
        if self.on { 0.1 } else { 0.0 }
    }

    fn friction(&self, _panel: usize) -> Vector3D {
        Vector3D::zero()
    }
}

/// Constant skin friction, no blowing
#[derive(Debug)]
struct ConstantFriction(Vector3D);

impl BoundaryLayer for ConstantFriction {
    fn recalculate(&mut self, _surface_velocities: ArrayView2<'_, f64>) {}

    fn blowing_velocity(&self, _panel: usize) -> f64 {
        0.0
    }

    fn friction(&self, _panel: usize) -> Vector3D {
        self.0
    }
}

fn sphere_solver(layer: Box<dyn BoundaryLayer>, parameters: SolverParameters) -> (Solver, BodyId) {
    let log_folder = std::env::temp_dir().join("math-aero-panel-tests").join("coupling");
    let mut solver = Solver::new(log_folder).with_parameters(parameters);
    let body = Body::new("sphere").with_non_lifting_surface(sphere(1.0, 6, 10).unwrap(), layer);
    let id = solver.add_body(body);
    solver.set_freestream_velocity(Vector3D::new(1.0, 0.0, 0.0));
    (solver, id)
}

fn proportional(gain: f64) -> Box<dyn BoundaryLayer> {
    Box::new(ProportionalBlowing {
        gain,
        blowing: Vec::new(),
    })
}

#[test]
fn test_passive_layers_take_one_pass() {
    let (mut solver, _) =
        sphere_solver(Box::new(DummyBoundaryLayer), SolverParameters::static_wake());
    let report = solver.solve(0.0, false).unwrap();
    assert_eq!(report.boundary_layer_status, BoundaryLayerStatus::Passive);
}

#[test]
fn test_coupling_converges() {
    let parameters = SolverParameters::static_wake().with_boundary_layer_iterations(50, 1e-6);
    let (mut solver, _) = sphere_solver(proportional(0.05), parameters);
    let report = solver.solve(0.0, false).unwrap();

    let BoundaryLayerStatus::Converged { iterations } = report.boundary_layer_status else {
        panic!("expected convergence, got {:?}", report.boundary_layer_status);
    };
    assert!(iterations >= 2);

    // Sources carry the blowing of the final layer state
    let surface = solver.bodies()[0].non_lifting_surfaces()[0].surface();
    let freestream = solver.freestream_velocity();
    let layer = solver.bodies()[0].non_lifting_surfaces()[0].boundary_layer();
    for p in 0..surface.n_panels() {
        let expected = -freestream.dot(&surface.panel_normal(p)) - layer.blowing_velocity(p);
        assert_relative_eq!(solver.source_coefficients()[p], expected, epsilon = 1e-12);
    }
}

#[test]
fn test_tighter_tolerance_needs_more_passes() {
    let passes = |tolerance: f64| {
        let parameters =
            SolverParameters::static_wake().with_boundary_layer_iterations(100, tolerance);
        let (mut solver, _) = sphere_solver(proportional(0.05), parameters);
        match solver.solve(0.0, false).unwrap().boundary_layer_status {
            BoundaryLayerStatus::Converged { iterations } => iterations,
            other => panic!("expected convergence, got {other:?}"),
        }
    };

    let loose = passes(1e-2);
    let medium = passes(1e-5);
    let tight = passes(1e-7);
    assert!(loose <= medium);
    assert!(medium <= tight);
    assert!(loose < tight);
}

#[test]
fn test_iteration_limit_keeps_last_state() {
    let parameters = SolverParameters::static_wake().with_boundary_layer_iterations(3, 1e-6);
    let (mut solver, _) = sphere_solver(Box::new(OscillatingBlowing::default()), parameters);
    let report = solver.solve(0.0, false).unwrap();

    assert_eq!(
        report.boundary_layer_status,
        BoundaryLayerStatus::IterationLimit { iterations: 5 }
    );
    // Pressures are still computed from the last pass
    assert!(solver.pressure_coefficients().iter().any(|&cp| cp != 0.0));
}

#[test]
fn test_friction_adds_to_force() {
    let friction = Vector3D::new(0.01, 0.0, 0.0);
    let (mut inviscid, inviscid_id) =
        sphere_solver(Box::new(DummyBoundaryLayer), SolverParameters::static_wake());
    let (mut viscous, viscous_id) =
        sphere_solver(Box::new(ConstantFriction(friction)), SolverParameters::static_wake());
    inviscid.solve(0.0, false).unwrap();
    let report = viscous.solve(0.0, false).unwrap();

    // Nothing feeds back into the sources, so the second pass changes nothing
    assert_eq!(
        report.boundary_layer_status,
        BoundaryLayerStatus::Converged { iterations: 2 }
    );

    let n_panels = viscous.n_panels() as f64;
    let difference = viscous.force(viscous_id) - inviscid.force(inviscid_id);
    assert_relative_eq!(difference.x, n_panels * friction.x, epsilon = 1e-8);
    assert_relative_eq!(difference.y, 0.0, epsilon = 1e-8);
    assert_relative_eq!(difference.z, 0.0, epsilon = 1e-8);
}
