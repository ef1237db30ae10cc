//! Potential and velocity anywhere in the flow

use super::Solver;
use crate::core::types::Vector3D;

impl Solver {
    /// Total velocity potential at `x`
    ///
    /// Points on a panel get the limit from outside the body.
    pub fn velocity_potential(&self, x: &Vector3D) -> f64 {
        self.disturbance_velocity_potential(x) + self.freestream_velocity.dot(x)
    }

    /// Total flow velocity at `x`
    pub fn velocity(&self, x: &Vector3D) -> Vector3D {
        self.disturbance_velocity(x) + self.freestream_velocity
    }

    /// Potential induced by all body and wake singularities
    pub fn disturbance_velocity_potential(&self, x: &Vector3D) -> f64 {
        let mut phi = 0.0;
        for slot in self.index.slots() {
            let surface = self.slot_surface(slot);
            for panel in 0..slot.n_panels {
                let (source, doublet) = surface.source_and_doublet_influence(x, panel);
                phi += doublet * self.doublet_coefficients[slot.offset + panel];
                phi += source * self.source_coefficients[slot.offset + panel];
            }
        }

        for (_, data) in self.lifting_surfaces() {
            let wake = data.wake();
            for panel in 0..wake.n_panels() {
                phi += wake.doublet_influence(x, panel) * wake.doublet_coefficient(panel);
            }
        }
        phi
    }

    /// Velocity induced by all body and wake singularities
    ///
    /// A wake contributes once it holds at least one full panel row.
    pub fn disturbance_velocity(&self, x: &Vector3D) -> Vector3D {
        let mut velocity = Vector3D::zero();
        for slot in self.index.slots() {
            let surface = self.slot_surface(slot);
            for panel in 0..slot.n_panels {
                velocity += surface.vortex_ring_unit_velocity(x, panel)
                    * self.doublet_coefficients[slot.offset + panel];
                velocity += surface.source_unit_velocity(x, panel)
                    * self.source_coefficients[slot.offset + panel];
            }
        }

        for (_, data) in self.lifting_surfaces() {
            let wake = data.wake();
            if wake.n_panels() < wake.n_spanwise_panels() {
                continue;
            }
            for panel in 0..wake.n_panels() {
                velocity +=
                    wake.vortex_ring_unit_velocity(x, panel) * wake.doublet_coefficient(panel);
            }
        }
        velocity
    }

    /// Velocity induced by the wake panels whose strength is already fixed,
    /// that is every panel except each wake's newest row
    pub(super) fn assigned_wake_velocity(&self, x: &Vector3D) -> Vector3D {
        let mut velocity = Vector3D::zero();
        for (_, data) in self.lifting_surfaces() {
            let wake = data.wake();
            let assigned = wake.newest_row_start().unwrap_or(0);
            for panel in 0..assigned {
                velocity +=
                    wake.vortex_ring_unit_velocity(x, panel) * wake.doublet_coefficient(panel);
            }
        }
        velocity
    }
}
