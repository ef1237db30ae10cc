//! Trailing wakes
//!
//! A wake is a strip of quadrilateral doublet panels shed from the trailing
//! edge of a lifting surface. Node rows are appended, oldest first, so the
//! last node row is always the one attached to the trailing edge and the last
//! panel row is the newest. Doublet strengths live in an append-only list of
//! rows; only the newest row is rewritten, by the Kutta condition.

use crate::core::mesh::{LiftingSurface, Surface, SurfaceId, SurfaceLimit};
use crate::core::types::Vector3D;

/// Wake attached to one lifting surface
#[derive(Debug)]
pub struct Wake {
    surface: Surface,
    n_spanwise_nodes: usize,
    doublet_rows: Vec<Vec<f64>>,
    row_ages: Vec<f64>,
}

impl Wake {
    /// Empty wake sized for the trailing edge of `lifting_surface`
    pub fn new(lifting_surface: &LiftingSurface) -> Self {
        Self {
            surface: Surface::empty(),
            n_spanwise_nodes: lifting_surface.n_spanwise_nodes(),
            doublet_rows: Vec::new(),
            row_ages: Vec::new(),
        }
    }

    /// Wake mesh
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Identity of the wake mesh
    pub fn id(&self) -> SurfaceId {
        self.surface.id()
    }

    /// Number of wake panels
    pub fn n_panels(&self) -> usize {
        self.surface.n_panels()
    }

    /// Number of wake nodes
    pub fn n_nodes(&self) -> usize {
        self.surface.n_nodes()
    }

    /// Nodes per row
    pub fn n_spanwise_nodes(&self) -> usize {
        self.n_spanwise_nodes
    }

    /// Panels per row
    pub fn n_spanwise_panels(&self) -> usize {
        self.n_spanwise_nodes - 1
    }

    /// Number of node rows
    pub fn n_node_rows(&self) -> usize {
        self.surface.n_nodes() / self.n_spanwise_nodes
    }

    /// Number of panel rows
    pub fn n_panel_rows(&self) -> usize {
        self.doublet_rows.len()
    }

    /// Index of the first panel of the newest row, if any row exists
    pub fn newest_row_start(&self) -> Option<usize> {
        self.n_panels().checked_sub(self.n_spanwise_panels())
    }

    /// Doublet strength of one wake panel
    pub fn doublet_coefficient(&self, panel: usize) -> f64 {
        let width = self.n_spanwise_panels();
        self.doublet_rows[panel / width][panel % width]
    }

    /// All doublet strengths in panel order
    pub fn doublet_coefficients(&self) -> Vec<f64> {
        self.doublet_rows.iter().flatten().copied().collect()
    }

    /// Doublet strengths of the newest panel row
    pub fn newest_row_doublets(&self) -> &[f64] {
        self.doublet_rows.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Time each panel row has spent in the wake
    pub fn row_ages(&self) -> &[f64] {
        &self.row_ages
    }

    /// Write the doublet strength of the newest panel at spanwise station `j`
    pub(crate) fn set_newest_row_doublet(&mut self, j: usize, value: f64) {
        if let Some(row) = self.doublet_rows.last_mut() {
            row[j] = value;
        }
    }

    /// Replace the newest row of doublets, used to roll back a failed step
    pub(crate) fn restore_newest_row_doublets(&mut self, values: &[f64]) {
        if let Some(row) = self.doublet_rows.last_mut() {
            row.copy_from_slice(values);
        }
    }

    /// Doublet potential of a wake panel at a field point
    pub fn doublet_influence(&self, x: &Vector3D, panel: usize) -> f64 {
        self.surface
            .panel_geometry(panel)
            .doublet_potential(x, SurfaceLimit::Exterior)
    }

    /// Velocity induced at `x` by a unit doublet on a wake panel
    pub fn vortex_ring_unit_velocity(&self, x: &Vector3D, panel: usize) -> Vector3D {
        self.surface.vortex_ring_unit_velocity(x, panel)
    }

    /// Append a node row at the current trailing edge
    ///
    /// Once two rows exist, a panel row joining the previous last row to the
    /// new one is added with zero doublet strength.
    pub fn add_layer(&mut self, lifting_surface: &LiftingSurface) {
        let te_surface = lifting_surface.surface();
        for j in 0..self.n_spanwise_nodes {
            self.surface
                .push_node(te_surface.node(lifting_surface.trailing_edge_node(j)));
        }

        let n_rows = self.n_node_rows();
        if n_rows >= 2 {
            let older = (n_rows - 2) * self.n_spanwise_nodes;
            let newer = (n_rows - 1) * self.n_spanwise_nodes;
            for j in 0..self.n_spanwise_panels() {
                self.surface.push_panel_unchecked(vec![
                    older + j,
                    older + j + 1,
                    newer + j + 1,
                    newer + j,
                ]);
            }
            self.doublet_rows.push(vec![0.0; self.n_spanwise_panels()]);
            self.row_ages.push(0.0);
        }

        self.compute_geometry();
    }

    /// Advance per-row state by one time step and refresh the geometry
    pub fn update_properties(&mut self, dt: f64) {
        for age in &mut self.row_ages {
            *age += dt;
        }
        self.compute_geometry();
    }

    /// Recompute panel geometry after the nodes moved
    pub fn compute_geometry(&mut self) {
        self.surface.compute_geometry();
    }

    /// Node positions, oldest row first
    pub fn nodes(&self) -> &[Vector3D] {
        self.surface.nodes()
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Vector3D] {
        self.surface.nodes_mut()
    }

    /// Move the trailing-edge row by `offset`
    pub(crate) fn translate_trailing_edge_row(&mut self, offset: Vector3D) {
        let n_nodes = self.n_nodes();
        let Some(start) = n_nodes.checked_sub(self.n_spanwise_nodes) else {
            return;
        };
        for node in &mut self.surface.nodes_mut()[start..] {
            *node += offset;
        }
        self.compute_geometry();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mesh::{naca4_section, wing};
    use approx::assert_relative_eq;

    fn lifting() -> LiftingSurface {
        let section = naca4_section("0012", 6).unwrap();
        wing(&section, 1.0, 3.0, 4, false).unwrap()
    }

    #[test]
    fn test_layers_and_rows() {
        let lifting = lifting();
        let mut wake = Wake::new(&lifting);
        wake.add_layer(&lifting);
        assert_eq!(wake.n_node_rows(), 1);
        assert_eq!(wake.n_panels(), 0);
        assert!(wake.newest_row_start().is_none());

        for node in wake.nodes_mut() {
            node.x += 0.5;
        }
        wake.add_layer(&lifting);
        assert_eq!(wake.n_node_rows(), 2);
        assert_eq!(wake.n_panels(), 3);
        assert_eq!(wake.newest_row_start(), Some(0));

        // Newest panels point towards the upper side of the wing
        for panel in 0..wake.n_panels() {
            assert_relative_eq!(wake.surface().panel_normal(panel).z, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_only_newest_row_is_written() {
        let lifting = lifting();
        let mut wake = Wake::new(&lifting);
        wake.add_layer(&lifting);
        for row in 0..3 {
            wake.translate_trailing_edge_row(Vector3D::new(0.1, 0.0, 0.0));
            for node in wake.nodes_mut() {
                node.x += 0.2;
            }
            wake.add_layer(&lifting);
            for j in 0..wake.n_spanwise_panels() {
                wake.set_newest_row_doublet(j, (row * 10 + j) as f64);
            }
        }
        assert_eq!(wake.n_panel_rows(), 3);
        assert_eq!(wake.doublet_coefficient(0), 0.0);
        assert_eq!(wake.doublet_coefficient(4), 11.0);
        assert_eq!(wake.newest_row_doublets(), &[20.0, 21.0, 22.0]);
        assert_eq!(wake.doublet_coefficients().len(), wake.n_panels());
    }

    #[test]
    fn test_update_properties_ages_rows() {
        let lifting = lifting();
        let mut wake = Wake::new(&lifting);
        wake.add_layer(&lifting);
        wake.translate_trailing_edge_row(Vector3D::new(1.0, 0.0, 0.0));
        wake.add_layer(&lifting);
        wake.update_properties(0.25);
        wake.update_properties(0.25);
        assert_eq!(wake.row_ages(), &[0.5]);
    }

    #[test]
    fn test_collapsed_first_row_induces_nothing() {
        let lifting = lifting();
        let mut wake = Wake::new(&lifting);
        wake.add_layer(&lifting);
        wake.add_layer(&lifting);
        let x = Vector3D::new(2.0, 0.3, 0.4);
        assert_eq!(wake.vortex_ring_unit_velocity(&x, 0), Vector3D::zero());
        assert_eq!(wake.doublet_influence(&x, 0), 0.0);
    }
}
