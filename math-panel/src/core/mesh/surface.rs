//! Panelled surfaces
//!
//! A [`Surface`] owns its nodes and panel connectivity together with the
//! cached geometry of every panel and the list of edge neighbours used for
//! surface gradients. Influence kernels are evaluated per panel through
//! [`PanelGeometry`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::ArrayView1;

use super::MeshError;
use super::panel::{PanelGeometry, SurfaceLimit};
use crate::core::types::Vector3D;

static NEXT_SURFACE_ID: AtomicUsize = AtomicUsize::new(0);

/// Process-unique identity of a surface (wakes included)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(usize);

impl SurfaceId {
    fn next() -> Self {
        SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// Panelled surface with cached geometry
#[derive(Debug)]
pub struct Surface {
    id: SurfaceId,
    nodes: Vec<Vector3D>,
    panels: Vec<Vec<usize>>,
    geometry: Vec<PanelGeometry>,
    neighbours: Vec<Vec<usize>>,
}

impl Surface {
    /// Build a surface from nodes and panels (3 or 4 node indices each)
    pub fn new(nodes: Vec<Vector3D>, panels: Vec<Vec<usize>>) -> Result<Self, MeshError> {
        let mut surface = Self::empty();
        surface.nodes = nodes;
        for panel in panels {
            surface.push_panel(panel)?;
        }
        surface.compute_neighbours();
        Ok(surface)
    }

    /// Surface without nodes or panels
    pub(crate) fn empty() -> Self {
        Self {
            id: SurfaceId::next(),
            nodes: Vec::new(),
            panels: Vec::new(),
            geometry: Vec::new(),
            neighbours: Vec::new(),
        }
    }

    /// Identity of this surface
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Number of nodes
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of panels
    pub fn n_panels(&self) -> usize {
        self.panels.len()
    }

    /// All node positions
    pub fn nodes(&self) -> &[Vector3D] {
        &self.nodes
    }

    /// Position of one node
    pub fn node(&self, node: usize) -> Vector3D {
        self.nodes[node]
    }

    /// All panels as node index lists
    pub fn panels(&self) -> &[Vec<usize>] {
        &self.panels
    }

    /// Node indices of one panel
    pub fn panel_nodes(&self, panel: usize) -> &[usize] {
        &self.panels[panel]
    }

    /// Panels sharing an edge with `panel`
    pub fn panel_neighbours(&self, panel: usize) -> &[usize] {
        &self.neighbours[panel]
    }

    /// Unit normal of a panel
    pub fn panel_normal(&self, panel: usize) -> Vector3D {
        self.geometry[panel].normal()
    }

    /// Area of a panel
    pub fn panel_surface_area(&self, panel: usize) -> f64 {
        self.geometry[panel].area()
    }

    /// Collocation point of a panel
    pub fn panel_collocation_point(&self, panel: usize) -> Vector3D {
        self.geometry[panel].collocation_point()
    }

    /// Cached geometry of a panel
    pub fn panel_geometry(&self, panel: usize) -> &PanelGeometry {
        &self.geometry[panel]
    }

    /// Source and doublet potential of `panel` at a field point
    ///
    /// Points lying on the panel get the exterior limit.
    pub fn source_and_doublet_influence(&self, x: &Vector3D, panel: usize) -> (f64, f64) {
        self.geometry[panel].source_and_doublet_potential(x, SurfaceLimit::Exterior)
    }

    /// Source and doublet potential of `panel` at the collocation point of
    /// `target_panel` on `target`, taken just inside the body
    pub fn source_and_doublet_influence_on_panel(
        &self,
        target: &Surface,
        target_panel: usize,
        panel: usize,
    ) -> (f64, f64) {
        let x = target.panel_collocation_point(target_panel);
        if self.id == target.id && target_panel == panel {
            return (self.geometry[panel].source_potential(&x), 0.5);
        }
        self.geometry[panel].source_and_doublet_potential(&x, SurfaceLimit::Interior)
    }

    /// Velocity induced at `x` by a unit source on `panel`
    pub fn source_unit_velocity(&self, x: &Vector3D, panel: usize) -> Vector3D {
        self.geometry[panel].source_unit_velocity(x)
    }

    /// Velocity induced at `x` by a unit doublet on `panel`
    pub fn vortex_ring_unit_velocity(&self, x: &Vector3D, panel: usize) -> Vector3D {
        self.geometry[panel].vortex_ring_unit_velocity(x)
    }

    /// Tangential gradient of a per-panel scalar field
    ///
    /// `values[offset + k]` holds the value on panel `k` of this surface. The
    /// gradient is a least-squares fit over the edge neighbours in the panel's
    /// tangent plane; it is zero when fewer than two neighbours exist or the
    /// fit is singular.
    pub fn scalar_field_gradient(
        &self,
        values: ArrayView1<'_, f64>,
        offset: usize,
        panel: usize,
    ) -> Vector3D {
        let neighbours = &self.neighbours[panel];
        if neighbours.len() < 2 {
            return Vector3D::zero();
        }

        let normal = self.panel_normal(panel);
        let center = self.panel_collocation_point(panel);
        let vertices = self.geometry[panel].vertices();
        let Some(e1) = (vertices[1] - vertices[0]).reject(&normal).normalize() else {
            return Vector3D::zero();
        };
        let e2 = normal.cross(&e1);

        let f0 = values[offset + panel];
        let (mut sxx, mut sxy, mut syy, mut sxf, mut syf) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for &neighbour in neighbours {
            let d = self.panel_collocation_point(neighbour) - center;
            let dx = d.dot(&e1);
            let dy = d.dot(&e2);
            let df = values[offset + neighbour] - f0;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
            sxf += dx * df;
            syf += dy * df;
        }

        let det = sxx * syy - sxy * sxy;
        if det.abs() <= 1e-12 * (sxx * syy).max(f64::MIN_POSITIVE) {
            return Vector3D::zero();
        }
        let gx = (syy * sxf - sxy * syf) / det;
        let gy = (sxx * syf - sxy * sxf) / det;
        e1 * gx + e2 * gy
    }

    /// Move every node by `offset`
    pub fn translate(&mut self, offset: Vector3D) {
        for node in &mut self.nodes {
            *node += offset;
        }
        self.compute_geometry();
    }

    /// Recompute the cached panel geometry from the current nodes
    ///
    /// Panels that collapsed to zero area stop inducing anything.
    pub fn compute_geometry(&mut self) {
        for (panel, geometry) in self.panels.iter().zip(self.geometry.iter_mut()) {
            let corners: Vec<Vector3D> = panel.iter().map(|&n| self.nodes[n]).collect();
            if !geometry.update(&corners) {
                log::trace!("{}: panel {:?} collapsed", self.id, panel);
            }
        }
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Vector3D] {
        &mut self.nodes
    }

    pub(crate) fn push_node(&mut self, node: Vector3D) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append a panel; its geometry must be valid at insertion time
    pub(crate) fn push_panel(&mut self, panel: Vec<usize>) -> Result<usize, MeshError> {
        let index = self.panels.len();
        if let Some(&bad) = panel.iter().find(|&&n| n >= self.nodes.len()) {
            return Err(MeshError::NodeOutOfRange {
                panel: index,
                node: bad,
                n_nodes: self.nodes.len(),
            });
        }
        let corners: Vec<Vector3D> = panel.iter().map(|&n| self.nodes[n]).collect();
        let geometry =
            PanelGeometry::new(&corners).ok_or(MeshError::DegeneratePanel { panel: index })?;
        self.panels.push(panel);
        self.geometry.push(geometry);
        self.neighbours.push(Vec::new());
        Ok(index)
    }

    /// Append a panel that may be collapsed at insertion time
    pub(crate) fn push_panel_unchecked(&mut self, panel: Vec<usize>) -> usize {
        let corners: Vec<Vector3D> = panel.iter().map(|&n| self.nodes[n]).collect();
        let geometry = PanelGeometry::from_corners(&corners)
            .unwrap_or_else(|| PanelGeometry::collapsed(self.nodes[panel[0]]));
        self.panels.push(panel);
        self.geometry.push(geometry);
        self.neighbours.push(Vec::new());
        self.panels.len() - 1
    }

    /// Rebuild the edge-neighbour lists
    pub(crate) fn compute_neighbours(&mut self) {
        let mut edges: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (p, panel) in self.panels.iter().enumerate() {
            let n = panel.len();
            for k in 0..n {
                let (a, b) = (panel[k], panel[(k + 1) % n]);
                edges.entry((a.min(b), a.max(b))).or_default().push(p);
            }
        }

        let mut neighbours = vec![Vec::new(); self.panels.len()];
        for sharing in edges.values() {
            for &p in sharing {
                for &q in sharing {
                    if p != q && !neighbours[p].contains(&q) {
                        neighbours[p].push(q);
                    }
                }
            }
        }
        for list in &mut neighbours {
            list.sort_unstable();
        }
        self.neighbours = neighbours;
    }

    /// Forget that two panels are neighbours (used across trailing edges)
    pub(crate) fn disconnect_panels(&mut self, a: usize, b: usize) {
        self.neighbours[a].retain(|&n| n != b);
        self.neighbours[b].retain(|&n| n != a);
    }
}
