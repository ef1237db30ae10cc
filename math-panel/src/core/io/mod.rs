//! Input/Output: simulation configuration and surface writers

pub mod config;
pub mod writer;

pub use config::*;
pub use writer::{JsonSurfaceWriter, SurfaceWriter, WriterError};
