//! JSON/TOML configuration for wing simulations
//!
//! The configuration carries the solver parameters plus the flow, geometry
//! and run settings used by the `wing-simulator` binary. Both formats are
//! read through serde; the format follows the file extension.
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! description = "NACA 0012 at 5 degrees"
//!
//! [flow]
//! freestream = [30.0, 0.0, 0.0]
//!
//! [wing]
//! naca = "0012"
//! span = 8.0
//! angle_of_attack_deg = 5.0
//!
//! [run]
//! time_step = 0.01
//! n_steps = 50
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::constants::DEFAULT_FLUID_DENSITY;
use crate::core::parameters::SolverParameters;
use crate::core::types::Vector3D;

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Problem description
    #[serde(default)]
    pub description: String,

    /// Solver parameters
    #[serde(default)]
    pub solver: SolverParameters,

    /// Freestream and fluid
    pub flow: FlowConfig,

    /// Wing geometry
    pub wing: WingConfig,

    /// Time stepping and output
    #[serde(default)]
    pub run: RunConfig,
}

/// Freestream and fluid properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Freestream velocity in m/s
    pub freestream: [f64; 3],

    /// Fluid density in kg/m³
    #[serde(default = "default_density")]
    pub density: f64,
}

/// Rectangular wing built from a NACA 4-digit section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WingConfig {
    /// NACA 4-digit designation, e.g. "0012"
    pub naca: String,

    /// Chord length in m
    #[serde(default = "default_chord")]
    pub chord: f64,

    /// Span in m
    pub span: f64,

    /// Section points per side (upper and lower)
    #[serde(default = "default_n_chordwise")]
    pub n_chordwise: usize,

    /// Node stations along the span
    #[serde(default = "default_n_spanwise")]
    pub n_spanwise: usize,

    /// Close the wing tips with triangle fans
    #[serde(default = "default_true")]
    pub close_tips: bool,

    /// Geometric angle of attack in degrees
    #[serde(default)]
    pub angle_of_attack_deg: f64,
}

/// Time stepping and logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Time step in s
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// Number of steps
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,

    /// Output folder for surface logs
    #[serde(default = "default_log_folder")]
    pub log_folder: PathBuf,

    /// Write surface logs every N steps (0 = never)
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            n_steps: default_n_steps(),
            log_folder: default_log_folder(),
            log_interval: default_log_interval(),
        }
    }
}

fn default_density() -> f64 {
    DEFAULT_FLUID_DENSITY
}
fn default_chord() -> f64 {
    1.0
}
fn default_n_chordwise() -> usize {
    16
}
fn default_n_spanwise() -> usize {
    17
}
fn default_true() -> bool {
    true
}
fn default_time_step() -> f64 {
    0.01
}
fn default_n_steps() -> usize {
    100
}
fn default_log_folder() -> PathBuf {
    PathBuf::from("vtk")
}
fn default_log_interval() -> usize {
    1
}

impl SimulationConfig {
    /// Freestream velocity as a vector
    pub fn freestream_velocity(&self) -> Vector3D {
        Vector3D::from_array(self.flow.freestream)
    }
}

/// Configuration file format
#[derive(Debug, Clone, Copy)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Load a simulation configuration from a file
///
/// Format is auto-detected from file extension (.json or .toml)
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

    parse_config(&content, format)
}

/// Parse a simulation configuration from a string
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<SimulationConfig, ConfigError> {
    match format {
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
        }
    }
}

/// Save a simulation configuration to a file
pub fn save_config<P: AsRef<Path>>(config: &SimulationConfig, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

    let content = serialize_config(config, format)?;
    fs::write(path, content)?;
    Ok(())
}

/// Serialize a simulation configuration to a string
pub fn serialize_config(
    config: &SimulationConfig,
    format: ConfigFormat,
) -> Result<String, ConfigError> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::SerializeError(e.to_string())),
        ConfigFormat::Toml => {
            toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Serialize error
    #[error("Serialize error: {0}")]
    SerializeError(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
        "description": "Rectangular wing",
        "solver": {
            "convect_wake": false,
            "linear_solver_tolerance": 1e-8
        },
        "flow": {
            "freestream": [30.0, 0.0, 0.0]
        },
        "wing": {
            "naca": "2412",
            "span": 6.0,
            "angle_of_attack_deg": 4.0
        },
        "run": {
            "n_steps": 10,
            "log_folder": "out"
        }
    }"#;

    const SAMPLE_TOML: &str = r#"
description = "Rectangular wing"

[solver]
convect_wake = true
unsteady_bernoulli = false

[flow]
freestream = [25.0, 0.0, 1.0]
density = 1.0

[wing]
naca = "0012"
span = 4.0
n_spanwise = 9
"#;

    #[test]
    fn test_parse_json() {
        let config = parse_config(SAMPLE_JSON, ConfigFormat::Json).unwrap();

        assert_eq!(config.description, "Rectangular wing");
        assert!(!config.solver.convect_wake);
        assert!((config.solver.linear_solver_tolerance - 1e-8).abs() < 1e-20);
        assert!(config.solver.unsteady_bernoulli);
        assert!((config.flow.density - DEFAULT_FLUID_DENSITY).abs() < 1e-12);
        assert_eq!(config.wing.naca, "2412");
        assert_eq!(config.wing.n_chordwise, 16);
        assert_eq!(config.run.n_steps, 10);
        assert_eq!(config.run.log_folder, PathBuf::from("out"));
    }

    #[test]
    fn test_parse_toml() {
        let config = parse_config(SAMPLE_TOML, ConfigFormat::Toml).unwrap();

        assert!(!config.solver.unsteady_bernoulli);
        assert_eq!(config.freestream_velocity(), Vector3D::new(25.0, 0.0, 1.0));
        assert_eq!(config.wing.n_spanwise, 9);
        assert!(config.wing.close_tips);
        assert_eq!(config.run.time_step, 0.01);
    }

    #[test]
    fn test_serialize_round_trip_toml() {
        let config = parse_config(SAMPLE_JSON, ConfigFormat::Json).unwrap();
        let toml = serialize_config(&config, ConfigFormat::Toml).unwrap();
        let back = parse_config(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(back.solver, config.solver);
        assert_eq!(back.wing.naca, config.wing.naca);
    }

    #[test]
    fn test_format_detection() {
        assert!(matches!(ConfigFormat::from_path("a.JSON"), Some(ConfigFormat::Json)));
        assert!(matches!(ConfigFormat::from_path("a.toml"), Some(ConfigFormat::Toml)));
        assert!(ConfigFormat::from_path("a.yaml").is_none());
        assert!(matches!(
            load_config("does-not-exist.yaml"),
            Err(ConfigError::Io(_))
        ));
    }
}
