//! Boundary-layer models coupled to the inviscid solution
//!
//! A boundary layer feeds back into the panel method through a blowing
//! velocity (added to the source strength) and a friction force (added to the
//! integrated loads). Layers that do neither report themselves as passive, and
//! the solver skips the viscous/inviscid iteration when every layer is passive.

use ndarray::ArrayView2;

use crate::core::types::Vector3D;

/// Boundary layer attached to one surface
pub trait BoundaryLayer: Send + Sync + std::fmt::Debug {
    /// Whether the layer never feeds anything back into the flow
    fn is_passive(&self) -> bool {
        false
    }

    /// Update the layer from the surface velocities of its surface
    ///
    /// `surface_velocities` has one row `[vx, vy, vz]` per panel.
    fn recalculate(&mut self, surface_velocities: ArrayView2<'_, f64>);

    /// Transpiration velocity through `panel`, positive out of the body
    fn blowing_velocity(&self, panel: usize) -> f64;

    /// Friction force acting on `panel`
    fn friction(&self, panel: usize) -> Vector3D;
}

/// Inviscid placeholder: no blowing, no friction
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyBoundaryLayer;

impl BoundaryLayer for DummyBoundaryLayer {
    fn is_passive(&self) -> bool {
        true
    }

    fn recalculate(&mut self, _surface_velocities: ArrayView2<'_, f64>) {}

    fn blowing_velocity(&self, _panel: usize) -> f64 {
        0.0
    }

    fn friction(&self, _panel: usize) -> Vector3D {
        Vector3D::zero()
    }
}
