//! Unsteady potential-flow panel method
//!
//! ## Architecture
//!
//! - `types`: 3D vector type
//! - `constants`: numerical constants and tolerances
//! - `mesh`: panels, surfaces, lifting surfaces and mesh generators
//! - `wake`: trailing wakes shed from lifting surfaces
//! - `boundary_layer`: viscous models coupled to the inviscid solution
//! - `body`: rigid bodies grouping surfaces under one set of kinematics
//! - `parameters`: solver tunables
//! - `solver`: influence assembly, linear solve, wakes and loads
//! - `io`: configuration files and surface writers
//! - `parallel`: portable parallel iteration (rayon or sequential)

pub mod body;
pub mod boundary_layer;
pub mod constants;
pub mod io;
pub mod mesh;
pub mod parallel;
pub mod parameters;
pub mod solver;
pub mod types;
pub mod wake;

// Re-exports for convenience
pub use body::{Body, LiftingSurfaceData, SurfaceData};
pub use boundary_layer::{BoundaryLayer, DummyBoundaryLayer};
pub use io::{JsonSurfaceWriter, SurfaceWriter, WriterError};
pub use mesh::{LiftingSurface, MeshError, Surface, SurfaceId};
pub use parameters::SolverParameters;
pub use solver::{BodyId, BoundaryLayerStatus, SolveReport, Solver, SolverError};
pub use types::Vector3D;
pub use wake::Wake;
