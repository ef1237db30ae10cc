//! Unsteady rectangular-wing simulator
//!
//! Builds a wing from a NACA 4-digit section, sheds a wake from its trailing
//! edge, and marches the panel solver in time. Lift and drag coefficients are
//! printed per step; surface and wake distributions are written as JSON.
//!
//! Usage:
//!   cargo run --release --bin wing-simulator -- --config configs/wing.toml
//!   cargo run --release --bin wing-simulator -- --help

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use math_aero_panel::core::io::{JsonSurfaceWriter, load_config};
use math_aero_panel::core::mesh::{naca4_section, wing};
use math_aero_panel::{Body, DummyBoundaryLayer, Solver, Vector3D};

#[derive(Parser, Debug)]
#[command(name = "wing-simulator")]
#[command(about = "Unsteady potential-flow simulation of a rectangular wing", long_about = None)]
struct Args {
    /// Path to JSON or TOML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Override the number of time steps
    #[arg(short = 'n', long)]
    steps: Option<usize>,

    /// Override the output folder
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    configure_threads(args.threads)?;

    let config = load_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let n_steps = args.steps.unwrap_or(config.run.n_steps);
    let log_folder = args.output.unwrap_or_else(|| config.run.log_folder.clone());
    let dt = config.run.time_step;

    println!("Wing simulator v{} ({})", math_aero_panel::VERSION, math_aero_panel::GIT_HASH);
    if !config.description.is_empty() {
        println!("{}", config.description);
    }

    let section = naca4_section(&config.wing.naca, config.wing.n_chordwise)?;
    let lifting_surface = wing(
        &section,
        config.wing.chord,
        config.wing.span,
        config.wing.n_spanwise,
        config.wing.close_tips,
    )?;
    let n_panels = lifting_surface.surface().n_panels();
    let body = Body::new("wing").with_lifting_surface(lifting_surface, Box::new(DummyBoundaryLayer));

    // The wing stays at rest; the angle of attack tilts the freestream
    let speed = config.freestream_velocity().norm();
    let alpha = config.wing.angle_of_attack_deg.to_radians();
    let freestream = Vector3D::new(speed * alpha.cos(), 0.0, speed * alpha.sin());

    let mut solver = Solver::new(log_folder.clone()).with_parameters(config.solver.clone());
    let wing_id = solver.add_body(body);
    solver.set_freestream_velocity(freestream);
    solver.set_fluid_density(config.flow.density);

    println!(
        "{} panels, alpha = {:.2} deg, |V| = {:.2} m/s, {} steps of {} s",
        n_panels, config.wing.angle_of_attack_deg, speed, n_steps, dt
    );

    let q_s = 0.5 * config.flow.density * speed * speed * config.wing.chord * config.wing.span;
    let lift_direction = Vector3D::new(-alpha.sin(), 0.0, alpha.cos());
    let drag_direction = Vector3D::new(alpha.cos(), 0.0, alpha.sin());

    let mut writer = JsonSurfaceWriter;
    solver.initialize_wakes(dt);
    for step in 0..n_steps {
        let report = solver
            .solve(dt, true)
            .with_context(|| format!("solving step {step}"))?;

        let force = solver.force(wing_id);
        let (cl, cd) = if q_s > 0.0 {
            (force.dot(&lift_direction) / q_s, force.dot(&drag_direction) / q_s)
        } else {
            (0.0, 0.0)
        };
        println!(
            "step {:4}  t = {:8.4}  CL = {:9.5}  CDi = {:9.5}  ({} linear iterations)",
            step,
            step as f64 * dt,
            cl,
            cd,
            report.linear_iterations
        );

        if config.run.log_interval > 0 && step % config.run.log_interval == 0 {
            solver
                .log(step, &mut writer)
                .with_context(|| format!("writing step {step} to {}", log_folder.display()))?;
        }

        solver.update_wakes(dt);
    }

    Ok(())
}

#[cfg(feature = "native")]
fn configure_threads(threads: Option<usize>) -> anyhow::Result<()> {
    if let Some(threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring thread pool")?;
    }
    Ok(())
}

#[cfg(not(feature = "native"))]
fn configure_threads(threads: Option<usize>) -> anyhow::Result<()> {
    if threads.is_some() {
        log::warn!("Built without the native feature, --threads is ignored");
    }
    Ok(())
}
