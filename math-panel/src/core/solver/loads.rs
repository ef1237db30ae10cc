//! Surface potentials, pressure coefficients and integrated loads

use ndarray::Array1;

use super::{BodyId, Solver};
use crate::core::body::Body;
use crate::core::constants::EPSY;
use crate::core::parallel::{parallel_map, parallel_map_indexed};
use crate::core::types::Vector3D;

/// Unsteady Bernoulli pressure coefficient
///
/// Zero when the reference speed vanishes.
pub(crate) fn pressure_coefficient(
    surface_velocity: &Vector3D,
    dphidt: f64,
    v_ref_squared: f64,
) -> f64 {
    if v_ref_squared <= EPSY {
        return 0.0;
    }
    1.0 - (surface_velocity.norm_squared() + 2.0 * dphidt) / v_ref_squared
}

impl Solver {
    /// Squared speed of the body relative to the freestream
    pub(super) fn reference_velocity_squared(&self, body: &Body) -> f64 {
        (body.velocity() - self.freestream_velocity).norm_squared()
    }

    fn surface_velocity_potential_of(&self, i: usize) -> f64 {
        let (slot, panel) = self.index.locate(i);
        let surface = self.slot_surface(slot);
        let x = surface.panel_collocation_point(panel);

        if self.parameters.marcov_surface_velocity {
            return self.velocity_potential(&x);
        }

        let body = &self.bodies[slot.body];
        let apparent = body.panel_kinematic_velocity(surface, panel) - self.freestream_velocity;
        -self.doublet_coefficients[i] - apparent.dot(&x)
    }

    /// Refresh surface potentials and pressure coefficients
    pub(super) fn compute_pressures(&mut self, dt: f64) {
        log::debug!("Computing pressure distribution");
        for body in &self.bodies {
            if self.reference_velocity_squared(body) <= EPSY {
                log::debug!(
                    "Body '{}' is at rest relative to the freestream, pressure coefficients set to zero",
                    body.id()
                );
            }
        }

        let potentials =
            parallel_map_indexed(self.n_panels(), |i| self.surface_velocity_potential_of(i));
        self.surface_velocity_potentials = Array1::from(potentials);

        let unsteady = self.parameters.unsteady_bernoulli && dt > 0.0;
        let coefficients = parallel_map_indexed(self.n_panels(), |i| {
            let (slot, _) = self.index.locate(i);
            let v_ref_squared = self.reference_velocity_squared(&self.bodies[slot.body]);
            let dphidt = if unsteady {
                (self.surface_velocity_potentials[i] - self.previous_surface_velocity_potentials[i])
                    / dt
            } else {
                0.0
            };
            pressure_coefficient(&self.surface_velocity_row(i), dphidt, v_ref_squared)
        });
        self.pressure_coefficients = Array1::from(coefficients);
    }

    /// Pressure plus friction force on every panel of a body, with the point
    /// it acts at
    fn panel_loads(&self, body_index: usize) -> Vec<(Vector3D, Vector3D)> {
        let q = 0.5 * self.fluid_density * self.reference_velocity_squared(&self.bodies[body_index]);
        let panels: Vec<usize> = self
            .index
            .slots()
            .iter()
            .filter(|slot| slot.body == body_index)
            .flat_map(|slot| slot.range())
            .collect();

        parallel_map(&panels, |&i| {
            let (slot, panel) = self.index.locate(i);
            let surface = self.slot_surface(slot);
            // Positive Cp pushes against the outward normal
            let pressure = surface.panel_normal(panel)
                * (-q * surface.panel_surface_area(panel) * self.pressure_coefficients[i]);
            let friction = self.slot_boundary_layer(slot).friction(panel);
            (surface.panel_collocation_point(panel), pressure + friction)
        })
    }

    /// Aerodynamic force on a body (zero for an unknown body)
    pub fn force(&self, body: BodyId) -> Vector3D {
        if body.index() >= self.bodies.len() {
            log::warn!("Solver::force(): {body} is not registered");
            return Vector3D::zero();
        }
        self.panel_loads(body.index())
            .into_iter()
            .map(|(_, force)| force)
            .sum()
    }

    /// Aerodynamic moment on a body about `x` (zero for an unknown body)
    pub fn moment(&self, body: BodyId, x: &Vector3D) -> Vector3D {
        if body.index() >= self.bodies.len() {
            log::warn!("Solver::moment(): {body} is not registered");
            return Vector3D::zero();
        }
        self.panel_loads(body.index())
            .into_iter()
            .map(|(point, force)| (point - *x).cross(&force))
            .sum()
    }
}
