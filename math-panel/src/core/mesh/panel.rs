//! Flat-panel geometry and constant-strength influence kernels
//!
//! Conventions:
//! - panel nodes run counter-clockwise about the outward normal;
//! - a unit doublet has potential `-Ω/4π`, with Ω the solid angle the panel
//!   subtends (positive seen from the outward side), so the potential jumps
//!   by `-μ` going from the inside to the outside;
//! - a unit source has potential `-(1/4π)∫dS/r`.
//!
//! The doublet velocity equals the Biot-Savart velocity of a unit vortex ring
//! running along the panel nodes.

use crate::core::constants::{
    COPLANAR_TOLERANCE, EDGE_LOG_TOLERANCE, EPSY, MAX_PANEL_NODES, PI2, PI4, VORTEX_CORE_TOLERANCE,
};
use crate::core::types::Vector3D;

/// Which one-sided limit to take for points lying on the panel itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceLimit {
    /// Approach from the side the normal points to
    Exterior,
    /// Approach from behind the panel
    Interior,
    /// Cauchy principal value (the discontinuous term is dropped)
    PrincipalValue,
}

/// Cached geometry of one panel
#[derive(Debug, Clone)]
pub struct PanelGeometry {
    vertices: [Vector3D; MAX_PANEL_NODES],
    projected: [Vector3D; MAX_PANEL_NODES],
    n_vertices: usize,
    normal: Vector3D,
    area: f64,
    collocation_point: Vector3D,
    size: f64,
    degenerate: bool,
}

/// Where a point sits relative to a panel
enum Placement {
    OnPanel,
    InPlaneOutside,
    OffPlane,
}

impl PanelGeometry {
    /// Build the geometry of a triangle or quadrilateral
    ///
    /// Returns `None` for degenerate panels (wrong node count or zero area).
    pub fn new(corners: &[Vector3D]) -> Option<Self> {
        let geometry = Self::from_corners(corners)?;
        (!geometry.degenerate).then_some(geometry)
    }

    /// Build the geometry, accepting collapsed panels
    ///
    /// A collapsed panel (zero area) induces nothing. Wake panels pass
    /// through this state when the apparent velocity vanishes.
    pub fn from_corners(corners: &[Vector3D]) -> Option<Self> {
        let n_vertices = corners.len();
        if !(3..=MAX_PANEL_NODES).contains(&n_vertices) {
            return None;
        }

        let area_vector = if n_vertices == 3 {
            (corners[1] - corners[0]).cross(&(corners[2] - corners[0]))
        } else {
            (corners[2] - corners[0]).cross(&(corners[3] - corners[1]))
        };
        let area = 0.5 * area_vector.norm();
        let normal = area_vector.normalize().unwrap_or_default();
        let degenerate = area <= EPSY || normal == Vector3D::zero();

        let collocation_point =
            corners.iter().copied().sum::<Vector3D>() / n_vertices as f64;

        let mut vertices = [Vector3D::zero(); MAX_PANEL_NODES];
        let mut projected = [Vector3D::zero(); MAX_PANEL_NODES];
        for (k, corner) in corners.iter().enumerate() {
            vertices[k] = *corner;
            projected[k] = *corner - normal * normal.dot(&(*corner - collocation_point));
        }

        Some(Self {
            vertices,
            projected,
            n_vertices,
            normal,
            area: if degenerate { 0.0 } else { area },
            collocation_point,
            size: area.sqrt(),
            degenerate,
        })
    }

    /// Zero-area placeholder located at `point`
    pub(crate) fn collapsed(point: Vector3D) -> Self {
        Self {
            vertices: [point; MAX_PANEL_NODES],
            projected: [point; MAX_PANEL_NODES],
            n_vertices: 3,
            normal: Vector3D::zero(),
            area: 0.0,
            collocation_point: point,
            size: 0.0,
            degenerate: true,
        }
    }

    /// True for collapsed panels
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Unit normal (outward for correctly oriented meshes)
    pub fn normal(&self) -> Vector3D {
        self.normal
    }

    /// Panel area
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Collocation point (node average)
    pub fn collocation_point(&self) -> Vector3D {
        self.collocation_point
    }

    /// Node positions
    pub fn vertices(&self) -> &[Vector3D] {
        &self.vertices[..self.n_vertices]
    }

    fn edges(&self) -> impl Iterator<Item = (Vector3D, Vector3D)> + '_ {
        let n = self.n_vertices;
        (0..n).map(move |k| (self.vertices[k], self.vertices[(k + 1) % n]))
    }

    fn projected_edges(&self) -> impl Iterator<Item = (Vector3D, Vector3D)> + '_ {
        let n = self.n_vertices;
        (0..n).map(move |k| (self.projected[k], self.projected[(k + 1) % n]))
    }

    fn placement(&self, x: &Vector3D) -> Placement {
        let tol = COPLANAR_TOLERANCE * self.size;
        if self.normal.dot(&(*x - self.collocation_point)).abs() > tol {
            return Placement::OffPlane;
        }
        let inside = self.projected_edges().all(|(a, b)| {
            let Some(t) = (b - a).normalize() else {
                return true;
            };
            let outward = t.cross(&self.normal);
            (a - *x).dot(&outward) > tol
        });
        if inside {
            Placement::OnPanel
        } else {
            Placement::InPlaneOutside
        }
    }

    /// Signed solid angle subtended by the panel at `x`
    ///
    /// Computed with the Van Oosterom-Strackee formula over a fan of triangles.
    pub fn solid_angle(&self, x: &Vector3D, limit: SurfaceLimit) -> f64 {
        if self.degenerate {
            return 0.0;
        }
        match self.placement(x) {
            Placement::OnPanel => match limit {
                SurfaceLimit::Exterior => PI2,
                SurfaceLimit::Interior => -PI2,
                SurfaceLimit::PrincipalValue => 0.0,
            },
            Placement::InPlaneOutside => 0.0,
            Placement::OffPlane => {
                let mut omega = 0.0;
                for k in 1..self.n_vertices - 1 {
                    omega += triangle_solid_angle(
                        self.vertices[0] - *x,
                        self.vertices[k] - *x,
                        self.vertices[k + 1] - *x,
                    );
                }
                omega
            }
        }
    }

    /// Potential of a unit doublet
    pub fn doublet_potential(&self, x: &Vector3D, limit: SurfaceLimit) -> f64 {
        -self.solid_angle(x, limit) / PI4
    }

    /// Potential of a unit source
    pub fn source_potential(&self, x: &Vector3D) -> f64 {
        if self.degenerate {
            return 0.0;
        }
        let z = self.normal.dot(&(*x - self.collocation_point));
        let mut integral = 0.0;
        for (a, b) in self.projected_edges() {
            if let Some((outward, log_term)) = self.edge_terms(x, a, b) {
                integral += (a - *x).dot(&outward) * log_term;
            }
        }
        if z != 0.0 {
            integral -= z * self.solid_angle(x, SurfaceLimit::PrincipalValue);
        }
        -integral / PI4
    }

    /// Source and doublet potentials together
    pub fn source_and_doublet_potential(&self, x: &Vector3D, limit: SurfaceLimit) -> (f64, f64) {
        (self.source_potential(x), self.doublet_potential(x, limit))
    }

    /// Velocity induced by a unit source (principal value on the panel)
    pub fn source_unit_velocity(&self, x: &Vector3D) -> Vector3D {
        if self.degenerate {
            return Vector3D::zero();
        }
        let mut velocity = Vector3D::zero();
        for (a, b) in self.projected_edges() {
            if let Some((outward, log_term)) = self.edge_terms(x, a, b) {
                velocity += outward * log_term;
            }
        }
        velocity += self.normal * self.solid_angle(x, SurfaceLimit::PrincipalValue);
        velocity / PI4
    }

    /// Velocity induced by a unit doublet, i.e. by a unit vortex ring on the panel edges
    pub fn vortex_ring_unit_velocity(&self, x: &Vector3D) -> Vector3D {
        if self.degenerate {
            return Vector3D::zero();
        }
        self.edges()
            .map(|(a, b)| vortex_segment_velocity(x, &a, &b))
            .sum::<Vector3D>()
            / PI4
    }

    /// Outward in-plane edge normal and edge logarithm `ln((ra + rb + l) / (ra + rb - l))`
    fn edge_terms(&self, x: &Vector3D, a: Vector3D, b: Vector3D) -> Option<(Vector3D, f64)> {
        let edge = b - a;
        let length = edge.norm();
        if length <= EPSY {
            return None;
        }
        let ra = (*x - a).norm();
        let rb = (*x - b).norm();
        let denominator = ra + rb - length;
        if denominator <= EDGE_LOG_TOLERANCE * length {
            return None;
        }
        let outward = (edge / length).cross(&self.normal);
        Some((outward, ((ra + rb + length) / denominator).ln()))
    }

    /// Recompute after the nodes have moved
    ///
    /// Returns false when the panel collapsed.
    pub fn update(&mut self, corners: &[Vector3D]) -> bool {
        if let Some(geometry) = PanelGeometry::from_corners(corners) {
            *self = geometry;
        }
        !self.degenerate
    }
}

fn triangle_solid_angle(a: Vector3D, b: Vector3D, c: Vector3D) -> f64 {
    let (la, lb, lc) = (a.norm(), b.norm(), c.norm());
    let numerator = a.dot(&b.cross(&c));
    let denominator = la * lb * lc + a.dot(&b) * lc + a.dot(&c) * lb + b.dot(&c) * la;
    -2.0 * numerator.atan2(denominator)
}

/// Biot-Savart velocity of a straight segment with unit circulation, without the 1/4π factor
fn vortex_segment_velocity(x: &Vector3D, a: &Vector3D, b: &Vector3D) -> Vector3D {
    let r0 = *b - *a;
    let r1 = *x - *a;
    let r2 = *x - *b;
    let cross = r1.cross(&r2);
    let cross_sq = cross.norm_squared();
    let l_sq = r0.norm_squared();
    if cross_sq <= VORTEX_CORE_TOLERANCE * l_sq * l_sq {
        return Vector3D::zero();
    }
    let n1 = r1.norm();
    let n2 = r2.norm();
    cross * (r0.dot(&(r1 / n1 - r2 / n2)) / cross_sq)
}
