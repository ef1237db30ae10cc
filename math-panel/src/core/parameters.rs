//! Solver parameters
//!
//! Every field has a serde default so configuration files only need to list
//! the values they change. The parameters are read-only while a step runs.

use serde::{Deserialize, Serialize};

/// Tunables of the panel solver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverParameters {
    /// Convect wake nodes with the local flow (true) or keep a single straight wake row (false)
    #[serde(default = "default_true")]
    pub convect_wake: bool,

    /// Length of the straight wake used when `convect_wake` is off
    #[serde(default = "default_static_wake_length")]
    pub static_wake_length: f64,

    /// Fraction of one step's travel at which the first wake row is shed behind the trailing edge
    #[serde(default = "default_wake_emission_distance_factor")]
    pub wake_emission_distance_factor: f64,

    /// Shed along the trailing-edge bisector instead of along the apparent velocity
    #[serde(default = "default_true")]
    pub wake_emission_follow_bisector: bool,

    /// Iteration budget of the linear solver
    #[serde(default = "default_linear_solver_max_iterations")]
    pub linear_solver_max_iterations: usize,

    /// Relative residual at which the linear solver stops
    #[serde(default = "default_linear_solver_tolerance")]
    pub linear_solver_tolerance: f64,

    /// Cap on boundary-layer coupling iterations
    #[serde(default = "default_max_boundary_layer_iterations")]
    pub max_boundary_layer_iterations: usize,

    /// Doublet-change norm below which the boundary-layer coupling has converged
    #[serde(default = "default_boundary_layer_iteration_tolerance")]
    pub boundary_layer_iteration_tolerance: f64,

    /// Include the ∂φ/∂t term in the pressure coefficient
    #[serde(default = "default_true")]
    pub unsteady_bernoulli: bool,

    /// Evaluate surface velocities and potentials by direct summation over all singularities
    #[serde(default)]
    pub marcov_surface_velocity: bool,
}

fn default_true() -> bool {
    true
}
fn default_static_wake_length() -> f64 {
    100.0
}
fn default_wake_emission_distance_factor() -> f64 {
    0.25
}
fn default_linear_solver_max_iterations() -> usize {
    20_000
}
fn default_linear_solver_tolerance() -> f64 {
    1e-10
}
fn default_max_boundary_layer_iterations() -> usize {
    100
}
fn default_boundary_layer_iteration_tolerance() -> f64 {
    1e-4
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            convect_wake: default_true(),
            static_wake_length: default_static_wake_length(),
            wake_emission_distance_factor: default_wake_emission_distance_factor(),
            wake_emission_follow_bisector: default_true(),
            linear_solver_max_iterations: default_linear_solver_max_iterations(),
            linear_solver_tolerance: default_linear_solver_tolerance(),
            max_boundary_layer_iterations: default_max_boundary_layer_iterations(),
            boundary_layer_iteration_tolerance: default_boundary_layer_iteration_tolerance(),
            unsteady_bernoulli: default_true(),
            marcov_surface_velocity: false,
        }
    }
}

impl SolverParameters {
    /// Parameters for a steady computation with a straight, fixed wake
    pub fn static_wake() -> Self {
        Self {
            convect_wake: false,
            unsteady_bernoulli: false,
            ..Self::default()
        }
    }

    /// Set wake convection on or off
    pub fn with_convect_wake(mut self, convect: bool) -> Self {
        self.convect_wake = convect;
        self
    }

    /// Set the linear solver budget
    pub fn with_linear_solver(mut self, max_iterations: usize, tolerance: f64) -> Self {
        self.linear_solver_max_iterations = max_iterations;
        self.linear_solver_tolerance = tolerance;
        self
    }

    /// Set the boundary-layer coupling budget
    pub fn with_boundary_layer_iterations(mut self, max_iterations: usize, tolerance: f64) -> Self {
        self.max_boundary_layer_iterations = max_iterations;
        self.boundary_layer_iteration_tolerance = tolerance;
        self
    }

    /// Enable or disable the unsteady Bernoulli term
    pub fn with_unsteady_bernoulli(mut self, enabled: bool) -> Self {
        self.unsteady_bernoulli = enabled;
        self
    }

    /// Enable or disable direct-summation surface velocities
    pub fn with_marcov_surface_velocity(mut self, enabled: bool) -> Self {
        self.marcov_surface_velocity = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let params: SolverParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(params, SolverParameters::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let params: SolverParameters =
            toml::from_str("convect_wake = false\nstatic_wake_length = 12.5\n").unwrap();
        assert!(!params.convect_wake);
        assert_eq!(params.static_wake_length, 12.5);
        assert_eq!(params.linear_solver_max_iterations, 20_000);
    }

    #[test]
    fn test_static_wake_preset() {
        let params = SolverParameters::static_wake();
        assert!(!params.convect_wake);
        assert!(!params.unsteady_bernoulli);
        assert!(params.wake_emission_follow_bisector);
    }
}
