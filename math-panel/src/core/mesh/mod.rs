//! Panel meshes, influence kernels and mesh generators

pub mod generators;
pub mod lifting;
pub mod panel;
pub mod surface;

pub use generators::*;
pub use lifting::LiftingSurface;
pub use panel::{PanelGeometry, SurfaceLimit};
pub use surface::{Surface, SurfaceId};

/// Mesh construction errors
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// A panel references a node that does not exist
    #[error("panel {panel} references node {node}, but the surface has {n_nodes} nodes")]
    NodeOutOfRange {
        /// Offending panel
        panel: usize,
        /// Offending node index
        node: usize,
        /// Number of nodes available
        n_nodes: usize,
    },

    /// A panel has the wrong node count or zero area
    #[error("panel {panel} is degenerate")]
    DegeneratePanel {
        /// Offending panel
        panel: usize,
    },

    /// Structured layout does not fit the data
    #[error("invalid mesh layout: {0}")]
    InvalidLayout(String),
}
