//! Numerical constants
//!
//! Tolerances are relative to panel size unless stated otherwise.

use std::f64::consts::PI;

/// 4π
pub const PI4: f64 = 4.0 * PI;

/// 2π
pub const PI2: f64 = 2.0 * PI;

/// Maximum nodes per panel
pub const MAX_PANEL_NODES: usize = 4;

/// Small epsilon for numerical comparisons
pub const EPSY: f64 = 1.0e-14;

/// Relative distance below which a point counts as lying in a panel's plane
pub const COPLANAR_TOLERANCE: f64 = 1.0e-10;

/// Relative squared length below which a vortex segment induces nothing
pub const VORTEX_CORE_TOLERANCE: f64 = 1.0e-12;

/// Relative tolerance for the edge logarithm of the source kernel
pub const EDGE_LOG_TOLERANCE: f64 = 1.0e-12;

/// Default fluid density in kg/m³ (air at sea level)
pub const DEFAULT_FLUID_DENSITY: f64 = 1.225;
