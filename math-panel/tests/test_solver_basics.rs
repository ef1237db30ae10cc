//! Solver bookkeeping tests
//!
//! Panel numbering across bodies, zero forcing, determinism and rollback of a
//! failed step.

use approx::assert_relative_eq;
use math_aero_panel::core::mesh::{box_mesh, naca4_section, sphere, wing};
use math_aero_panel::{Body, DummyBoundaryLayer, Solver, SolverError, SolverParameters, Vector3D};

fn log_folder(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join("math-aero-panel-tests").join(name)
}

fn wing_body(id: &str) -> Body {
    let section = naca4_section("0012", 8).unwrap();
    let lifting = wing(&section, 1.0, 4.0, 5, true).unwrap();
    Body::new(id).with_lifting_surface(lifting, Box::new(DummyBoundaryLayer))
}

fn sphere_solver() -> Solver {
    let body = Body::new("sphere")
        .with_non_lifting_surface(sphere(1.0, 8, 12).unwrap(), Box::new(DummyBoundaryLayer));
    let mut solver =
        Solver::new(log_folder("sphere")).with_parameters(SolverParameters::static_wake());
    solver.add_body(body);
    solver.set_freestream_velocity(Vector3D::new(1.0, 0.0, 0.0));
    solver
}

#[test]
fn test_panel_offsets_are_contiguous() {
    let first = Body::new("first")
        .with_non_lifting_surface(
            box_mesh(Vector3D::new(1.0, 1.0, 1.0), [1, 1, 1]).unwrap(),
            Box::new(DummyBoundaryLayer),
        )
        .with_lifting_surface(
            wing(&naca4_section("0012", 4).unwrap(), 1.0, 2.0, 3, false).unwrap(),
            Box::new(DummyBoundaryLayer),
        )
        .with_non_lifting_surface(sphere(0.5, 3, 4).unwrap(), Box::new(DummyBoundaryLayer));
    let second = Body::new("second")
        .with_non_lifting_surface(sphere(1.0, 4, 6).unwrap(), Box::new(DummyBoundaryLayer));

    let cube_id = first.non_lifting_surfaces()[0].surface().id();
    let ball_id = first.non_lifting_surfaces()[1].surface().id();
    let wing_id = first.lifting_surfaces()[0].surface().id();
    let other_id = second.non_lifting_surfaces()[0].surface().id();

    let mut solver = Solver::new(log_folder("offsets"));
    solver.add_body(first);
    solver.add_body(second);

    // Non-lifting surfaces first, then lifting ones, body after body
    assert_eq!(solver.panel_range(cube_id), Some(0..6));
    assert_eq!(solver.panel_range(ball_id), Some(6..18));
    assert_eq!(solver.panel_range(wing_id), Some(18..34));
    assert_eq!(solver.panel_range(other_id), Some(34..58));
    assert_eq!(solver.n_panels(), 58);
    assert_eq!(solver.doublet_coefficients().len(), 58);
    assert_eq!(solver.surface_velocities().dim(), (58, 3));
}

#[test]
fn test_body_at_rest_in_still_fluid() {
    let cube = Body::new("cube").with_non_lifting_surface(
        box_mesh(Vector3D::new(1.0, 1.0, 1.0), [2, 2, 2]).unwrap(),
        Box::new(DummyBoundaryLayer),
    );
    let mut solver = Solver::new(log_folder("rest"));
    let id = solver.add_body(cube);
    solver.add_body(wing_body("wing"));
    solver.initialize_wakes(0.1);

    solver.solve(0.1, true).unwrap();

    assert!(solver.source_coefficients().iter().all(|&s| s == 0.0));
    assert!(solver.doublet_coefficients().iter().all(|&m| m == 0.0));
    assert!(solver.pressure_coefficients().iter().all(|&cp| cp == 0.0));
    let wake = solver.bodies()[1].lifting_surfaces()[0].wake();
    assert!(wake.newest_row_doublets().iter().all(|&m| m == 0.0));
    assert_eq!(solver.force(id), Vector3D::zero());
}

#[test]
fn test_moving_plate_sources_follow_normal_velocity() {
    let plate = Body::new("plate")
        .with_non_lifting_surface(
            box_mesh(Vector3D::new(2.0, 2.0, 0.1), [4, 4, 1]).unwrap(),
            Box::new(DummyBoundaryLayer),
        )
        .with_velocity(Vector3D::new(0.0, 0.0, 1.0));
    let mut solver = Solver::new(log_folder("plate"))
        .with_parameters(SolverParameters::static_wake().with_unsteady_bernoulli(false));
    let id = solver.add_body(plate);

    solver.solve(0.0, false).unwrap();

    let surface = solver.bodies()[0].non_lifting_surfaces()[0].surface();
    for p in 0..surface.n_panels() {
        assert_relative_eq!(
            solver.source_coefficients()[p],
            surface.panel_normal(p).z,
            epsilon = 1e-12
        );
    }

    // Mirror symmetry about z = 0 cancels the steady pressure force
    let total_area: f64 = (0..surface.n_panels())
        .map(|p| surface.panel_surface_area(p))
        .sum();
    let q = 0.5 * solver.fluid_density();
    assert!(solver.force(id).norm() < 1e-5 * q * total_area);
}

#[test]
fn test_identical_solvers_agree_bitwise() {
    let mut a = sphere_solver();
    let mut b = sphere_solver();
    a.solve(0.0, true).unwrap();
    b.solve(0.0, true).unwrap();

    assert_eq!(a.doublet_coefficients(), b.doublet_coefficients());
    assert_eq!(a.source_coefficients(), b.source_coefficients());
    assert_eq!(a.surface_velocities(), b.surface_velocities());
    assert_eq!(a.pressure_coefficients(), b.pressure_coefficients());
}

#[test]
fn test_repeated_static_solve_is_bit_identical() {
    let mut solver = sphere_solver();
    solver.solve(0.0, true).unwrap();
    let doublets = solver.doublet_coefficients().to_owned();
    let velocities = solver.surface_velocities().to_owned();
    let pressures = solver.pressure_coefficients().to_owned();

    let report = solver.solve(0.0, true).unwrap();

    // The previous solution is fed back as the initial guess
    assert_eq!(report.linear_iterations, 0);
    assert_eq!(solver.doublet_coefficients(), doublets.view());
    assert_eq!(solver.surface_velocities(), velocities.view());
    assert_eq!(solver.pressure_coefficients(), pressures.view());
}

#[test]
fn test_field_queries_are_repeatable() {
    let mut solver = sphere_solver();
    solver.solve(0.0, false).unwrap();

    let x = Vector3D::new(1.7, -0.4, 0.3);
    assert_eq!(solver.velocity(&x), solver.velocity(&x));
    assert_eq!(solver.velocity_potential(&x), solver.velocity_potential(&x));
}

#[test]
fn test_failed_solve_restores_state() {
    let mut solver =
        Solver::new(log_folder("rollback")).with_parameters(SolverParameters::static_wake());
    solver.add_body(wing_body("wing"));
    solver.set_freestream_velocity(Vector3D::new(10.0, 0.0, 0.5));
    solver.initialize_wakes(0.1);
    solver.solve(0.1, true).unwrap();

    let doublets = solver.doublet_coefficients().to_owned();
    let sources = solver.source_coefficients().to_owned();
    let velocities = solver.surface_velocities().to_owned();
    let pressures = solver.pressure_coefficients().to_owned();
    let wake_row = solver.bodies()[0].lifting_surfaces()[0]
        .wake()
        .newest_row_doublets()
        .to_vec();

    solver.set_freestream_velocity(Vector3D::new(10.0, 0.0, -1.0));
    solver.set_parameters(SolverParameters::static_wake().with_linear_solver(1, 1e-15));
    let err = solver.solve(0.1, true).unwrap_err();

    assert!(matches!(err, SolverError::LinearSolveFailed { .. }));
    assert_eq!(solver.doublet_coefficients(), doublets.view());
    assert_eq!(solver.source_coefficients(), sources.view());
    assert_eq!(solver.surface_velocities(), velocities.view());
    assert_eq!(solver.pressure_coefficients(), pressures.view());
    assert_eq!(
        solver.bodies()[0].lifting_surfaces()[0].wake().newest_row_doublets(),
        wake_row.as_slice()
    );
}

#[test]
fn test_unknown_panel_lookups_fall_back() {
    let mut solver = sphere_solver();
    solver.solve(0.0, false).unwrap();

    let stranger = sphere(1.0, 3, 4).unwrap();
    assert_eq!(solver.pressure_coefficient(stranger.id(), 0), 0.0);
    assert_eq!(solver.surface_velocity_potential(stranger.id(), 0), 0.0);
    assert_eq!(solver.surface_velocity(stranger.id(), 0), Vector3D::zero());

    let own = solver.bodies()[0].non_lifting_surfaces()[0].surface().id();
    assert_eq!(solver.pressure_coefficient(own, 10_000), 0.0);
    assert_eq!(
        solver.pressure_coefficient(own, 3),
        solver.pressure_coefficients()[3]
    );
}
