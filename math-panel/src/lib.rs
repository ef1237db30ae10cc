//! # Panel: Unsteady Potential-Flow Panel Method
//!
//! Source/doublet panel solver for bodies and wings moving through a uniform
//! freestream, with time-marching trailing wakes.
//!
//! ## Features
//!
//! - Constant-strength flat panels with closed-form kernels
//! - Kutta condition folded into a dense, warm-started BiCGSTAB solve
//! - Convected or static wakes
//! - Unsteady Bernoulli pressures, forces and moments
//! - Pluggable boundary layers with viscous/inviscid iteration
//! - Parallel execution with Rayon (`native` feature)
//! - JSON output per time step
//!

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)] // Scientific code often has many parameters

pub mod core;

pub use crate::core::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (set during build)
pub const GIT_HASH: &str = env!("GIT_HASH");
