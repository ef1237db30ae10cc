//! Lifting wing tests
//!
//! Kutta condition, lift sign and magnitude, static and convected wakes.

use approx::assert_relative_eq;
use math_aero_panel::core::mesh::{naca4_section, wing};
use math_aero_panel::{
    Body, BodyId, DummyBoundaryLayer, LiftingSurface, Solver, SolverParameters, Vector3D,
};

const SPEED: f64 = 10.0;

fn rectangular_wing() -> LiftingSurface {
    let section = naca4_section("0012", 8).unwrap();
    wing(&section, 1.0, 4.0, 9, true).unwrap()
}

fn wing_solver(parameters: SolverParameters, alpha_deg: f64) -> (Solver, BodyId) {
    let log_folder = std::env::temp_dir().join("math-aero-panel-tests").join("wing");
    let mut solver = Solver::new(log_folder).with_parameters(parameters);
    let body =
        Body::new("wing").with_lifting_surface(rectangular_wing(), Box::new(DummyBoundaryLayer));
    let id = solver.add_body(body);
    let alpha = alpha_deg.to_radians();
    solver.set_freestream_velocity(Vector3D::new(SPEED * alpha.cos(), 0.0, SPEED * alpha.sin()));
    (solver, id)
}

fn assert_kutta(solver: &Solver) {
    let data = &solver.bodies()[0].lifting_surfaces()[0];
    let lifting = data.lifting_surface();
    let range = solver.panel_range(data.surface().id()).unwrap();
    let mu = solver.doublet_coefficients();
    let newest = data.wake().newest_row_doublets();
    assert_eq!(newest.len(), lifting.n_spanwise_panels());
    for (j, &wake_mu) in newest.iter().enumerate() {
        let upper = mu[range.start + lifting.trailing_edge_upper_panel(j)];
        let lower = mu[range.start + lifting.trailing_edge_lower_panel(j)];
        assert_eq!(wake_mu, upper - lower);
    }
}

fn lift_coefficient(solver: &Solver, id: BodyId, alpha_deg: f64) -> f64 {
    let alpha = alpha_deg.to_radians();
    let lift_direction = Vector3D::new(-alpha.sin(), 0.0, alpha.cos());
    let q = 0.5 * solver.fluid_density() * SPEED * SPEED;
    solver.force(id).dot(&lift_direction) / (q * 4.0)
}

#[test]
fn test_static_wake_wing_lifts() {
    let (mut solver, id) = wing_solver(SolverParameters::static_wake(), 5.0);
    solver.initialize_wakes(0.1);
    solver.solve(0.1, false).unwrap();

    assert_kutta(&solver);
    let cl = lift_coefficient(&solver, id, 5.0);
    // Finite-wing estimate 2 pi alpha AR / (AR + 2) is about 0.37
    assert!(cl > 0.15 && cl < 0.6, "CL = {cl}");
}

#[test]
fn test_symmetric_wing_without_incidence_has_no_lift() {
    let (mut solver, id) = wing_solver(SolverParameters::static_wake(), 0.0);
    solver.initialize_wakes(0.1);
    solver.solve(0.1, false).unwrap();

    assert_kutta(&solver);
    let cl = lift_coefficient(&solver, id, 0.0);
    assert!(cl.abs() < 1e-6, "CL = {cl}");
    for &mu in solver.bodies()[0].lifting_surfaces()[0].wake().newest_row_doublets() {
        assert!(mu.abs() < 1e-6);
    }
}

#[test]
fn test_lift_reverses_with_incidence() {
    let (mut up, up_id) = wing_solver(SolverParameters::static_wake(), 4.0);
    let (mut down, down_id) = wing_solver(SolverParameters::static_wake(), -4.0);
    for solver in [&mut up, &mut down] {
        solver.initialize_wakes(0.1);
        solver.solve(0.1, false).unwrap();
    }

    let cl_up = lift_coefficient(&up, up_id, 4.0);
    let cl_down = lift_coefficient(&down, down_id, -4.0);
    assert_relative_eq!(cl_up, -cl_down, max_relative = 1e-6);
}

#[test]
fn test_static_wake_follows_the_trailing_edge() {
    let (mut solver, id) = wing_solver(SolverParameters::static_wake(), 0.0);
    solver.initialize_wakes(0.1);
    solver.update_wakes(0.1);

    let check = |solver: &Solver| {
        let data = &solver.bodies()[0].lifting_surfaces()[0];
        let lifting = data.lifting_surface();
        let wake = data.wake();
        let n = lifting.n_spanwise_nodes();
        assert_eq!(wake.n_node_rows(), 2);
        assert_eq!(wake.n_panels(), lifting.n_spanwise_panels());
        for j in 0..n {
            let te = lifting.surface().node(lifting.trailing_edge_node(j));
            assert_relative_eq!(wake.nodes()[n + j].x, te.x);
            assert_relative_eq!(wake.nodes()[n + j].z, te.z);
            assert_relative_eq!(wake.nodes()[j].x, te.x + 100.0, epsilon = 1e-12);
            assert_relative_eq!(wake.nodes()[j].y, te.y, epsilon = 1e-12);
            assert_relative_eq!(wake.nodes()[j].z, te.z, epsilon = 1e-12);
        }
    };
    check(&solver);

    solver
        .body_mut(id)
        .unwrap()
        .set_position(Vector3D::new(0.0, 0.0, 0.5));
    solver.update_wakes(0.1);
    check(&solver);
    let te = solver.bodies()[0].lifting_surfaces()[0].surface().node(0);
    assert_relative_eq!(te.z, 0.5, epsilon = 1e-6);
}

#[test]
fn test_convected_wake_grows_one_row_per_step() {
    let dt = 0.05;
    let (mut solver, id) = wing_solver(SolverParameters::default(), 5.0);
    solver.initialize_wakes(dt);

    let n_spanwise_panels = rectangular_wing().n_spanwise_panels();
    for step in 0..4 {
        let wake = solver.bodies()[0].lifting_surfaces()[0].wake();
        assert_eq!(wake.n_panel_rows(), step + 1);
        assert_eq!(wake.n_panels(), (step + 1) * n_spanwise_panels);

        solver.solve(dt, true).unwrap();
        assert_kutta(&solver);
        // The first step has no previous potential to differentiate against
        if step > 0 {
            assert!(lift_coefficient(&solver, id, 5.0) > 0.0);
        }

        solver.update_wakes(dt);
    }

    let data = &solver.bodies()[0].lifting_surfaces()[0];
    let lifting = data.lifting_surface();
    let wake = data.wake();
    let n = lifting.n_spanwise_nodes();
    let last_row = wake.n_nodes() - n;
    for j in 0..n {
        assert_eq!(
            wake.nodes()[last_row + j],
            lifting.surface().node(lifting.trailing_edge_node(j))
        );
    }
    // Oldest row first, the row just shed is the youngest
    let ages = wake.row_ages();
    assert_relative_eq!(ages[0], 4.0 * dt, epsilon = 1e-12);
    assert_eq!(*ages.last().unwrap(), 0.0);

    // Shed vorticity travels downstream; mid-span avoids the tip vortices
    let mid = n / 2;
    let x_te = lifting.surface().node(lifting.trailing_edge_node(mid)).x;
    assert!(wake.nodes()[mid].x > x_te + 3.0 * dt * SPEED * 0.5);
}
