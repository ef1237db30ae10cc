//! Rigid bodies
//!
//! A body groups non-lifting surfaces and lifting surfaces (each with its own
//! wake) under one set of kinematics. Surfaces are attached while the body is
//! built; once the body is handed to the solver only its kinematics change.

use crate::core::boundary_layer::BoundaryLayer;
use crate::core::mesh::{LiftingSurface, Surface};
use crate::core::types::Vector3D;
use crate::core::wake::Wake;

/// Non-lifting surface with its boundary layer
#[derive(Debug)]
pub struct SurfaceData {
    surface: Surface,
    boundary_layer: Box<dyn BoundaryLayer>,
}

impl SurfaceData {
    /// Panelled surface
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Boundary layer attached to the surface
    pub fn boundary_layer(&self) -> &dyn BoundaryLayer {
        self.boundary_layer.as_ref()
    }

    pub(crate) fn boundary_layer_mut(&mut self) -> &mut dyn BoundaryLayer {
        self.boundary_layer.as_mut()
    }
}

/// Lifting surface with its boundary layer and wake
#[derive(Debug)]
pub struct LiftingSurfaceData {
    lifting_surface: LiftingSurface,
    boundary_layer: Box<dyn BoundaryLayer>,
    wake: Wake,
}

impl LiftingSurfaceData {
    /// Lifting surface
    pub fn lifting_surface(&self) -> &LiftingSurface {
        &self.lifting_surface
    }

    /// Panelled surface of the lifting surface
    pub fn surface(&self) -> &Surface {
        self.lifting_surface.surface()
    }

    /// Boundary layer attached to the surface
    pub fn boundary_layer(&self) -> &dyn BoundaryLayer {
        self.boundary_layer.as_ref()
    }

    /// Wake shed from the trailing edge
    pub fn wake(&self) -> &Wake {
        &self.wake
    }

    pub(crate) fn boundary_layer_mut(&mut self) -> &mut dyn BoundaryLayer {
        self.boundary_layer.as_mut()
    }

    pub(crate) fn wake_mut(&mut self) -> &mut Wake {
        &mut self.wake
    }

    /// Split borrow used when growing the wake from the trailing edge
    pub(crate) fn lifting_surface_and_wake_mut(&mut self) -> (&LiftingSurface, &mut Wake) {
        (&self.lifting_surface, &mut self.wake)
    }
}

/// Rigid body driven by prescribed kinematics
///
/// # Example
/// ```ignore
/// let body = Body::new("wing")
///     .with_lifting_surface(wing, Box::new(DummyBoundaryLayer))
///     .with_velocity(Vector3D::new(-30.0, 0.0, 0.0));
/// ```
#[derive(Debug)]
pub struct Body {
    id: String,
    position: Vector3D,
    velocity: Vector3D,
    rotational_velocity: Vector3D,
    non_lifting_surfaces: Vec<SurfaceData>,
    lifting_surfaces: Vec<LiftingSurfaceData>,
}

impl Body {
    /// Body at rest at the origin, without surfaces
    ///
    /// `id` names the body's output folder when logging.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: Vector3D::zero(),
            velocity: Vector3D::zero(),
            rotational_velocity: Vector3D::zero(),
            non_lifting_surfaces: Vec::new(),
            lifting_surfaces: Vec::new(),
        }
    }

    /// Attach a non-lifting surface
    pub fn with_non_lifting_surface(
        mut self,
        surface: Surface,
        boundary_layer: Box<dyn BoundaryLayer>,
    ) -> Self {
        self.non_lifting_surfaces.push(SurfaceData {
            surface,
            boundary_layer,
        });
        self
    }

    /// Attach a lifting surface; its wake starts empty
    pub fn with_lifting_surface(
        mut self,
        lifting_surface: LiftingSurface,
        boundary_layer: Box<dyn BoundaryLayer>,
    ) -> Self {
        let wake = Wake::new(&lifting_surface);
        self.lifting_surfaces.push(LiftingSurfaceData {
            lifting_surface,
            boundary_layer,
            wake,
        });
        self
    }

    /// Set the initial linear velocity
    pub fn with_velocity(mut self, velocity: Vector3D) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the initial rotational velocity (rad/s about `position`)
    pub fn with_rotational_velocity(mut self, rotational_velocity: Vector3D) -> Self {
        self.rotational_velocity = rotational_velocity;
        self
    }

    /// Name of the body
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reference point of the body
    pub fn position(&self) -> Vector3D {
        self.position
    }

    /// Linear velocity
    pub fn velocity(&self) -> Vector3D {
        self.velocity
    }

    /// Rotational velocity about [`Body::position`]
    pub fn rotational_velocity(&self) -> Vector3D {
        self.rotational_velocity
    }

    /// Non-lifting surfaces in registration order
    pub fn non_lifting_surfaces(&self) -> &[SurfaceData] {
        &self.non_lifting_surfaces
    }

    /// Lifting surfaces in registration order
    pub fn lifting_surfaces(&self) -> &[LiftingSurfaceData] {
        &self.lifting_surfaces
    }

    /// Every non-wake surface: non-lifting first, then lifting
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.non_lifting_surfaces
            .iter()
            .map(SurfaceData::surface)
            .chain(self.lifting_surfaces.iter().map(LiftingSurfaceData::surface))
    }

    pub(crate) fn non_lifting_surfaces_mut(&mut self) -> &mut [SurfaceData] {
        &mut self.non_lifting_surfaces
    }

    pub(crate) fn lifting_surfaces_mut(&mut self) -> &mut [LiftingSurfaceData] {
        &mut self.lifting_surfaces
    }

    /// Velocity of a rigidly attached point
    pub fn point_kinematic_velocity(&self, x: &Vector3D) -> Vector3D {
        self.velocity + self.rotational_velocity.cross(&(*x - self.position))
    }

    /// Kinematic velocity of the collocation point of `panel` on `surface`
    pub fn panel_kinematic_velocity(&self, surface: &Surface, panel: usize) -> Vector3D {
        self.point_kinematic_velocity(&surface.panel_collocation_point(panel))
    }

    /// Kinematic velocity of `node` on `surface`
    pub fn node_kinematic_velocity(&self, surface: &Surface, node: usize) -> Vector3D {
        self.point_kinematic_velocity(&surface.node(node))
    }

    /// Move the body, its surfaces and the trailing-edge rows of its wakes
    pub fn set_position(&mut self, position: Vector3D) {
        let offset = position - self.position;
        self.position = position;
        for data in &mut self.non_lifting_surfaces {
            data.surface.translate(offset);
        }
        for data in &mut self.lifting_surfaces {
            data.lifting_surface.surface_mut().translate(offset);
            data.wake.translate_trailing_edge_row(offset);
        }
    }

    /// Advance the position by `velocity * dt`
    pub fn advance(&mut self, dt: f64) {
        self.set_position(self.position + self.velocity * dt);
    }

    /// Set the linear velocity
    pub fn set_velocity(&mut self, velocity: Vector3D) {
        self.velocity = velocity;
    }

    /// Set the rotational velocity
    pub fn set_rotational_velocity(&mut self, rotational_velocity: Vector3D) {
        self.rotational_velocity = rotational_velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::boundary_layer::DummyBoundaryLayer;
    use crate::core::mesh::{box_mesh, naca4_section, wing};
    use approx::assert_relative_eq;

    #[test]
    fn test_rigid_kinematics() {
        let body = Body::new("spinner")
            .with_velocity(Vector3D::new(1.0, 0.0, 0.0))
            .with_rotational_velocity(Vector3D::new(0.0, 0.0, 2.0));
        let v = body.point_kinematic_velocity(&Vector3D::new(0.0, 1.0, 0.0));
        assert_relative_eq!(v.x, -1.0);
        assert_relative_eq!(v.y, 0.0);
        assert_relative_eq!(v.z, 0.0);
    }

    #[test]
    fn test_set_position_moves_surfaces_and_wake_edge() {
        let section = naca4_section("0012", 6).unwrap();
        let lifting = wing(&section, 1.0, 2.0, 3, false).unwrap();
        let cube = box_mesh(Vector3D::new(1.0, 1.0, 1.0), [1, 1, 1]).unwrap();
        let mut body = Body::new("moving")
            .with_non_lifting_surface(cube, Box::new(DummyBoundaryLayer))
            .with_lifting_surface(lifting, Box::new(DummyBoundaryLayer));

        {
            let data = &mut body.lifting_surfaces_mut()[0];
            let (lifting, wake) = data.lifting_surface_and_wake_mut();
            wake.add_layer(lifting);
        }

        let before = body.non_lifting_surfaces()[0].surface().panel_collocation_point(0);
        body.set_position(Vector3D::new(0.0, 0.0, 3.0));
        let after = body.non_lifting_surfaces()[0].surface().panel_collocation_point(0);
        assert_relative_eq!(after.z - before.z, 3.0);

        let data = &body.lifting_surfaces()[0];
        let te = data.surface().node(data.lifting_surface().trailing_edge_node(0));
        assert_eq!(data.wake().nodes()[0], te);
        assert_eq!(body.surfaces().count(), 2);
    }
}
