//! Per-step JSON output

use math_aero_panel::core::mesh::{naca4_section, sphere, wing};
use math_aero_panel::{
    Body, DummyBoundaryLayer, JsonSurfaceWriter, Solver, SolverParameters, Vector3D,
};

fn read_json(path: &std::path::Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("missing {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_log_writes_every_surface_and_wake() {
    let log_folder = std::env::temp_dir()
        .join("math-aero-panel-tests")
        .join(format!("logging-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&log_folder);

    let lifting = wing(&naca4_section("2412", 6).unwrap(), 1.0, 3.0, 4, false).unwrap();
    let n_wing_panels = lifting.surface().n_panels();
    let aircraft = Body::new("aircraft")
        .with_non_lifting_surface(sphere(0.3, 4, 6).unwrap(), Box::new(DummyBoundaryLayer))
        .with_lifting_surface(lifting, Box::new(DummyBoundaryLayer));

    let mut solver =
        Solver::new(log_folder.clone()).with_parameters(SolverParameters::static_wake());
    solver.add_body(aircraft);
    solver.set_freestream_velocity(Vector3D::new(5.0, 0.0, 0.0));
    solver.initialize_wakes(0.1);
    solver.solve(0.1, true).unwrap();
    solver.log(7, &mut JsonSurfaceWriter).unwrap();

    let body_folder = log_folder.join("aircraft");
    let fuselage = read_json(&body_folder.join("non_lifting_surface_0").join("step_7.json"));
    let wing = read_json(&body_folder.join("lifting_surface_0").join("step_7.json"));
    let wake = read_json(&body_folder.join("wake_0").join("step_7.json"));

    assert_eq!(fuselage["node_offset"], 0);
    assert_eq!(fuselage["panel_offset"], 0);
    assert_eq!(fuselage["panels"].as_array().unwrap().len(), 24);
    assert_eq!(wing["panel_offset"], 24);
    assert_eq!(wing["panels"].as_array().unwrap().len(), n_wing_panels);
    assert_eq!(wake["panel_offset"], 24 + n_wing_panels);

    let pressures = wing["views"]["PressureDistribution"].as_array().unwrap();
    assert_eq!(pressures.len(), n_wing_panels);
    assert!(wing["views"]["DoubletDistribution"].is_array());
    assert!(wing["views"]["SourceDistribution"].is_array());

    let wake_doublets = wake["views"]["DoubletDistribution"].as_array().unwrap();
    assert_eq!(wake_doublets.len(), 3);
    assert!(wake["views"].get("PressureDistribution").is_none());

    std::fs::remove_dir_all(&log_folder).unwrap();
}
