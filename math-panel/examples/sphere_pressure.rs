//! Sphere pressure check - compare panel Cp with potential-flow theory
//!
//! Prints Cp along the x-z meridian next to 1 - 9/4 sin^2(theta).

use math_aero_panel::core::mesh::sphere;
use math_aero_panel::{Body, DummyBoundaryLayer, Solver, SolverParameters, Vector3D};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let n_latitude = 16;
    let n_longitude = 32;
    let surface = sphere(1.0, n_latitude, n_longitude)?;
    let surface_id = surface.id();
    let body = Body::new("sphere").with_non_lifting_surface(surface, Box::new(DummyBoundaryLayer));

    let mut solver = Solver::new("vtk").with_parameters(SolverParameters::static_wake());
    let id = solver.add_body(body);
    solver.set_freestream_velocity(Vector3D::new(1.0, 0.0, 0.0));
    let report = solver.solve(0.0, false)?;

    println!("=== Sphere in uniform flow ===\n");
    println!(
        "{} panels, {} linear iterations, residual {:.2e}\n",
        solver.n_panels(),
        report.linear_iterations,
        report.linear_residual
    );
    println!("θ (deg) |  Cp (panel) | Cp (theory)");
    println!("--------|-------------|------------");

    let surface = solver.bodies()[0].non_lifting_surfaces()[0].surface();
    for p in 0..surface.n_panels() {
        let x = surface.panel_collocation_point(p);
        // First longitude band only, y ≈ 0 side
        if x.y.abs() > 0.2 || x.z.abs() > 0.99 {
            continue;
        }
        let r = x.norm();
        let cos_theta = x.x / r;
        let theta = cos_theta.acos();
        let theory = 1.0 - 2.25 * theta.sin().powi(2);
        println!(
            "{:>7.1}° | {:>11.4} | {:>10.4}",
            theta.to_degrees(),
            solver.pressure_coefficient(surface_id, p),
            theory
        );
    }

    let force = solver.force(id);
    println!(
        "\nNet force: ({:.3e}, {:.3e}, {:.3e}) N",
        force.x, force.y, force.z
    );
    Ok(())
}
