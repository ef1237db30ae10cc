//! Lifting surfaces
//!
//! A lifting surface is a structured mesh wrapped around a wing section:
//! node `(i, j)` sits at chordwise index `i` and spanwise index `j`, stored at
//! `i * n_spanwise_nodes + j`. The chordwise loop starts at the trailing edge,
//! runs over the upper side to the leading edge and back along the lower side,
//! closing on the trailing-edge row again. Extra panels (tip caps) may follow
//! the structured block.

use ndarray::ArrayView1;

use super::MeshError;
use super::surface::Surface;
use crate::core::types::Vector3D;

/// Surface with a sharp trailing edge that sheds a wake
#[derive(Debug)]
pub struct LiftingSurface {
    surface: Surface,
    n_chordwise_nodes: usize,
    n_spanwise_nodes: usize,
}

impl LiftingSurface {
    /// Wrap a surface laid out as described in the module documentation
    ///
    /// Panels across the trailing edge stop being gradient neighbours.
    pub fn new(
        mut surface: Surface,
        n_chordwise_nodes: usize,
        n_spanwise_nodes: usize,
    ) -> Result<Self, MeshError> {
        if n_chordwise_nodes < 3 || n_spanwise_nodes < 2 {
            return Err(MeshError::InvalidLayout(format!(
                "lifting surface needs at least 3x2 nodes, got {n_chordwise_nodes}x{n_spanwise_nodes}"
            )));
        }
        let structured_panels = n_chordwise_nodes * (n_spanwise_nodes - 1);
        if surface.n_nodes() < n_chordwise_nodes * n_spanwise_nodes
            || surface.n_panels() < structured_panels
        {
            return Err(MeshError::InvalidLayout(format!(
                "{} nodes / {} panels cannot hold a {}x{} lifting layout",
                surface.n_nodes(),
                surface.n_panels(),
                n_chordwise_nodes,
                n_spanwise_nodes
            )));
        }

        let n_spanwise_panels = n_spanwise_nodes - 1;
        for j in 0..n_spanwise_panels {
            surface.disconnect_panels(j, (n_chordwise_nodes - 1) * n_spanwise_panels + j);
        }
        Ok(Self {
            surface,
            n_chordwise_nodes,
            n_spanwise_nodes,
        })
    }

    /// Underlying panelled surface
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub(crate) fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Nodes around the section loop (trailing edge counted once)
    pub fn n_chordwise_nodes(&self) -> usize {
        self.n_chordwise_nodes
    }

    /// Panels around the section loop
    pub fn n_chordwise_panels(&self) -> usize {
        self.n_chordwise_nodes
    }

    /// Nodes along the span
    pub fn n_spanwise_nodes(&self) -> usize {
        self.n_spanwise_nodes
    }

    /// Panels along the span
    pub fn n_spanwise_panels(&self) -> usize {
        self.n_spanwise_nodes - 1
    }

    /// Index of the trailing-edge node at spanwise station `j`
    pub fn trailing_edge_node(&self, j: usize) -> usize {
        j
    }

    /// Upper-side panel touching the trailing edge at spanwise panel `j`
    pub fn trailing_edge_upper_panel(&self, j: usize) -> usize {
        j
    }

    /// Lower-side panel touching the trailing edge at spanwise panel `j`
    pub fn trailing_edge_lower_panel(&self, j: usize) -> usize {
        (self.n_chordwise_nodes - 1) * self.n_spanwise_panels() + j
    }

    /// Unit vector bisecting the trailing-edge angle at node station `j`, pointing aft
    pub fn trailing_edge_bisector(&self, j: usize) -> Vector3D {
        let te = self.surface.node(self.trailing_edge_node(j));
        let upper = self.surface.node(self.n_spanwise_nodes + j);
        let lower = self.surface.node((self.n_chordwise_nodes - 1) * self.n_spanwise_nodes + j);
        let a = (te - upper).normalize().unwrap_or_default();
        let b = (te - lower).normalize().unwrap_or_default();
        (a + b).normalize().unwrap_or(a)
    }

    /// Surface gradient, see [`Surface::scalar_field_gradient`]
    pub fn scalar_field_gradient(
        &self,
        values: ArrayView1<'_, f64>,
        offset: usize,
        panel: usize,
    ) -> Vector3D {
        self.surface.scalar_field_gradient(values, offset, panel)
    }
}
