//! Mesh generators for aerodynamic test geometries
//!
//! Provides functions to generate panel meshes for standard geometries:
//! NACA 4-digit wings, closed boxes and spheres. All generators orient the
//! panels so that normals point out of the body.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::MeshError;
use super::lifting::LiftingSurface;
use super::surface::Surface;
use crate::core::types::Vector3D;

/// Generate a NACA 4-digit section as a closed loop of `(x, z)` points
///
/// The loop starts at the trailing edge, runs over the upper side to the
/// leading edge and returns along the lower side. The trailing edge appears
/// once; the closed-trailing-edge thickness polynomial is used.
///
/// # Arguments
/// * `designation` - Four digits, e.g. `"2412"`
/// * `n_half` - Panels per side (cosine spacing)
///
/// # Returns
/// `2 * n_half` points for a unit chord
///
/// # Example
/// ```ignore
/// let section = naca4_section("0012", 20)?;
/// ```
pub fn naca4_section(designation: &str, n_half: usize) -> Result<Vec<[f64; 2]>, MeshError> {
    let digits: Vec<u32> = designation.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 4 || designation.len() != 4 {
        return Err(MeshError::InvalidLayout(format!(
            "NACA designation must have four digits, got {designation:?}"
        )));
    }
    if n_half < 2 {
        return Err(MeshError::InvalidLayout(
            "a section needs at least two panels per side".to_string(),
        ));
    }

    let m = digits[0] as f64 / 100.0;
    let p = digits[1] as f64 / 10.0;
    let t = (digits[2] * 10 + digits[3]) as f64 / 100.0;
    if t <= 0.0 {
        return Err(MeshError::InvalidLayout(format!(
            "section {designation} has zero thickness"
        )));
    }

    let thickness = |x: f64| {
        5.0 * t
            * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x * x + 0.2843 * x.powi(3)
                - 0.1036 * x.powi(4))
    };
    let camber = |x: f64| -> (f64, f64) {
        if m == 0.0 || p == 0.0 {
            (0.0, 0.0)
        } else if x < p {
            (
                m / (p * p) * (2.0 * p * x - x * x),
                2.0 * m / (p * p) * (p - x),
            )
        } else {
            let q = (1.0 - p) * (1.0 - p);
            (
                m / q * ((1.0 - 2.0 * p) + 2.0 * p * x - x * x),
                2.0 * m / q * (p - x),
            )
        }
    };
    let surface_point = |k: usize, upper: bool| -> [f64; 2] {
        let x = 0.5 * (1.0 + (PI * k as f64 / n_half as f64).cos());
        let yt = thickness(x).max(0.0);
        let (yc, slope) = camber(x);
        let theta = slope.atan();
        if upper {
            [x - yt * theta.sin(), yc + yt * theta.cos()]
        } else {
            [x + yt * theta.sin(), yc - yt * theta.cos()]
        }
    };

    let mut points = Vec::with_capacity(2 * n_half);
    for k in 0..=n_half {
        points.push(surface_point(k, true));
    }
    for k in (1..n_half).rev() {
        points.push(surface_point(k, false));
    }
    Ok(points)
}

/// Generate a rectangular, untwisted wing from a section loop
///
/// The leading edge lies on the y axis, the span runs from `-span/2` to
/// `span/2` and the trailing edge sits at `x = chord`.
///
/// # Arguments
/// * `section` - Loop of `(x, z)` points for a unit chord, trailing edge first
/// * `chord` - Chord length
/// * `span` - Wing span
/// * `n_spanwise_nodes` - Node stations along the span
/// * `close_tips` - Add triangle fans closing both wing tips
pub fn wing(
    section: &[[f64; 2]],
    chord: f64,
    span: f64,
    n_spanwise_nodes: usize,
    close_tips: bool,
) -> Result<LiftingSurface, MeshError> {
    let n_chordwise = section.len();
    if n_chordwise < 3 || n_spanwise_nodes < 2 {
        return Err(MeshError::InvalidLayout(format!(
            "wing needs at least 3x2 nodes, got {n_chordwise}x{n_spanwise_nodes}"
        )));
    }
    let node = |i: usize, j: usize| i * n_spanwise_nodes + j;

    let mut nodes = Vec::with_capacity(n_chordwise * n_spanwise_nodes + 2);
    for point in section {
        for j in 0..n_spanwise_nodes {
            let y = -0.5 * span + span * j as f64 / (n_spanwise_nodes - 1) as f64;
            nodes.push(Vector3D::new(chord * point[0], y, chord * point[1]));
        }
    }

    let mut panels = Vec::with_capacity(n_chordwise * n_spanwise_nodes);
    for i in 0..n_chordwise {
        let next = (i + 1) % n_chordwise;
        for j in 0..n_spanwise_nodes - 1 {
            panels.push(vec![node(i, j), node(i, j + 1), node(next, j + 1), node(next, j)]);
        }
    }

    if close_tips {
        for (j, reversed) in [(0, false), (n_spanwise_nodes - 1, true)] {
            let center = (0..n_chordwise)
                .map(|i| nodes[node(i, j)])
                .sum::<Vector3D>()
                / n_chordwise as f64;
            nodes.push(center);
            let c = nodes.len() - 1;
            for i in 0..n_chordwise {
                let next = (i + 1) % n_chordwise;
                if reversed {
                    panels.push(vec![c, node(next, j), node(i, j)]);
                } else {
                    panels.push(vec![c, node(i, j), node(next, j)]);
                }
            }
        }
    }

    let surface = Surface::new(nodes, panels)?;
    LiftingSurface::new(surface, n_chordwise, n_spanwise_nodes)
}

/// Generate a closed, axis-aligned box centered at the origin
///
/// # Arguments
/// * `size` - Edge lengths along x, y and z
/// * `divisions` - Panels along each edge direction
///
/// # Example
/// ```ignore
/// // 2 x 2 plate, 5 cm thick
/// let plate = box_mesh(Vector3D::new(2.0, 2.0, 0.05), [8, 8, 1])?;
/// ```
pub fn box_mesh(size: Vector3D, divisions: [usize; 3]) -> Result<Surface, MeshError> {
    if divisions.contains(&0) {
        return Err(MeshError::InvalidLayout(
            "box divisions must be positive".to_string(),
        ));
    }
    let extent = size.to_array();
    let position = |lattice: [usize; 3]| {
        let mut p = [0.0; 3];
        for axis in 0..3 {
            p[axis] = extent[axis] * (lattice[axis] as f64 / divisions[axis] as f64 - 0.5);
        }
        Vector3D::from_array(p)
    };

    let mut nodes = Vec::new();
    let mut lattice_index: HashMap<[usize; 3], usize> = HashMap::new();
    let mut node_at = |lattice: [usize; 3]| {
        *lattice_index.entry(lattice).or_insert_with(|| {
            nodes.push(position(lattice));
            nodes.len() - 1
        })
    };

    let mut panels = Vec::new();
    for a in 0..3 {
        // (b, c) completes a right-handed frame with a
        let b = (a + 1) % 3;
        let c = (a + 2) % 3;
        for side in [0, divisions[a]] {
            for ib in 0..divisions[b] {
                for ic in 0..divisions[c] {
                    let mut corner = |db: usize, dc: usize| {
                        let mut l = [0; 3];
                        l[a] = side;
                        l[b] = ib + db;
                        l[c] = ic + dc;
                        node_at(l)
                    };
                    let quad = [corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)];
                    if side == 0 {
                        panels.push(vec![quad[0], quad[3], quad[2], quad[1]]);
                    } else {
                        panels.push(quad.to_vec());
                    }
                }
            }
        }
    }

    Surface::new(nodes, panels)
}

/// Generate a UV sphere centered at the origin
///
/// Quad bands between latitude rings, triangle fans at the poles.
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `n_latitude` - Divisions in polar direction
/// * `n_longitude` - Divisions in azimuthal direction
pub fn sphere(radius: f64, n_latitude: usize, n_longitude: usize) -> Result<Surface, MeshError> {
    if n_latitude < 2 || n_longitude < 3 {
        return Err(MeshError::InvalidLayout(format!(
            "sphere needs at least 2x3 divisions, got {n_latitude}x{n_longitude}"
        )));
    }

    let mut nodes = vec![Vector3D::new(0.0, 0.0, radius)];
    for k in 1..n_latitude {
        let theta = PI * k as f64 / n_latitude as f64;
        for l in 0..n_longitude {
            let phi = 2.0 * PI * l as f64 / n_longitude as f64;
            nodes.push(Vector3D::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.sin() * phi.sin(),
                radius * theta.cos(),
            ));
        }
    }
    nodes.push(Vector3D::new(0.0, 0.0, -radius));
    let south = nodes.len() - 1;
    let ring = |k: usize, l: usize| 1 + (k - 1) * n_longitude + l % n_longitude;

    let mut panels = Vec::new();
    for l in 0..n_longitude {
        panels.push(vec![0, ring(1, l), ring(1, l + 1)]);
    }
    for k in 1..n_latitude - 1 {
        for l in 0..n_longitude {
            panels.push(vec![ring(k, l), ring(k + 1, l), ring(k + 1, l + 1), ring(k, l + 1)]);
        }
    }
    for l in 0..n_longitude {
        panels.push(vec![south, ring(n_latitude - 1, l + 1), ring(n_latitude - 1, l)]);
    }

    Surface::new(nodes, panels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn enclosed_volume(surface: &Surface) -> f64 {
        // Divergence theorem with the field x/3
        (0..surface.n_panels())
            .map(|p| {
                surface.panel_collocation_point(p).dot(&surface.panel_normal(p))
                    * surface.panel_surface_area(p)
                    / 3.0
            })
            .sum()
    }

    #[test]
    fn test_naca_symmetric_section() {
        let section = naca4_section("0012", 10).unwrap();
        assert_eq!(section.len(), 20);
        assert_relative_eq!(section[0][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(section[0][1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(section[10][0], 0.0, epsilon = 1e-12);
        // Upper and lower mirror each other
        assert_relative_eq!(section[3][1], -section[17][1], epsilon = 1e-12);
        let max_thickness = section.iter().map(|p| p[1]).fold(0.0, f64::max);
        assert_relative_eq!(max_thickness, 0.06, epsilon = 2e-3);
    }

    #[test]
    fn test_naca_rejects_bad_designation() {
        assert!(naca4_section("12", 10).is_err());
        assert!(naca4_section("2400", 10).is_err());
        assert!(naca4_section("0012", 1).is_err());
    }

    #[test]
    fn test_box_is_closed_and_outward() {
        let size = Vector3D::new(2.0, 1.0, 0.5);
        let surface = box_mesh(size, [4, 2, 1]).unwrap();
        assert_eq!(surface.n_panels(), 2 * (2 + 4 + 8));
        assert_relative_eq!(enclosed_volume(&surface), 1.0, epsilon = 1e-12);
        for p in 0..surface.n_panels() {
            assert_eq!(surface.panel_neighbours(p).len(), 4);
        }
    }

    #[test]
    fn test_sphere_is_closed_and_outward() {
        let surface = sphere(1.0, 12, 24).unwrap();
        assert_eq!(surface.n_panels(), 24 * 12);
        let volume = enclosed_volume(&surface);
        assert_relative_eq!(volume, 4.0 * PI / 3.0, max_relative = 0.05);
        for p in 0..surface.n_panels() {
            let c = surface.panel_collocation_point(p);
            assert!(c.dot(&surface.panel_normal(p)) > 0.0);
        }
    }

    #[test]
    fn test_closed_wing_encloses_positive_volume() {
        let section = naca4_section("2412", 12).unwrap();
        let lifting = wing(&section, 1.0, 3.0, 7, true).unwrap();
        let volume = enclosed_volume(lifting.surface());
        // Section area of a 12% NACA profile is about 0.082 c²
        assert_relative_eq!(volume, 0.082 * 3.0, max_relative = 0.1);
    }
}
