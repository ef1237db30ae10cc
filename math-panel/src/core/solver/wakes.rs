//! Wake shedding and convection

use super::Solver;
use crate::core::body::Body;
use crate::core::mesh::LiftingSurface;
use crate::core::parallel::parallel_map;
use crate::core::types::Vector3D;

impl Solver {
    /// Shed the first panel row of every wake
    ///
    /// Call once before the first step.
    pub fn initialize_wakes(&mut self, dt: f64) {
        log::info!("Initializing wakes");
        for body_index in 0..self.bodies.len() {
            for k in 0..self.bodies[body_index].lifting_surfaces().len() {
                let displacements = self.first_row_displacements(&self.bodies[body_index], k, dt);

                let data = &mut self.bodies[body_index].lifting_surfaces_mut()[k];
                let (lifting, wake) = data.lifting_surface_and_wake_mut();
                wake.add_layer(lifting);
                let start = wake.n_nodes() - displacements.len();
                for (node, displacement) in wake.nodes_mut()[start..].iter_mut().zip(&displacements)
                {
                    *node += *displacement;
                }
                wake.add_layer(lifting);
            }
        }
    }

    /// Advance every wake by one time step
    ///
    /// Convected wakes move with the local flow and grow by one panel row;
    /// static wakes are re-attached to the trailing edge.
    pub fn update_wakes(&mut self, dt: f64) {
        if self.parameters.convect_wake {
            self.convect_wakes(dt);
        } else {
            self.reposition_static_wakes();
        }
    }

    fn convect_wakes(&mut self, dt: f64) {
        log::info!("Convecting wakes");

        // Every node is sampled against the unmodified wakes before any moves
        let node_velocities: Vec<Vec<Vector3D>> = self
            .lifting_surfaces()
            .map(|(_, data)| parallel_map(data.wake().nodes(), |x| self.velocity(x)))
            .collect();

        let mut sampled = node_velocities.into_iter();
        for body_index in 0..self.bodies.len() {
            for k in 0..self.bodies[body_index].lifting_surfaces().len() {
                let velocities = sampled.next().unwrap_or_default();
                let emission: Vec<Vector3D> = {
                    let body = &self.bodies[body_index];
                    let lifting = body.lifting_surfaces()[k].lifting_surface();
                    (0..lifting.n_spanwise_nodes())
                        .map(|j| self.trailing_edge_emission_displacement(body, lifting, j, dt))
                        .collect()
                };

                let data = &mut self.bodies[body_index].lifting_surfaces_mut()[k];
                let (lifting, wake) = data.lifting_surface_and_wake_mut();
                let Some(trailing_edge_row) = wake.n_nodes().checked_sub(emission.len()) else {
                    log::warn!("Wake {} was never initialized, shedding its first row", wake.id());
                    wake.add_layer(lifting);
                    continue;
                };

                let nodes = wake.nodes_mut();
                for (node, velocity) in nodes[..trailing_edge_row].iter_mut().zip(&velocities) {
                    *node += *velocity * dt;
                }
                for (node, displacement) in nodes[trailing_edge_row..].iter_mut().zip(&emission) {
                    *node += *displacement;
                }

                wake.update_properties(dt);
                wake.add_layer(lifting);
            }
        }
    }

    fn reposition_static_wakes(&mut self) {
        log::info!("Re-positioning wakes");
        for body_index in 0..self.bodies.len() {
            let offset = self.static_wake_offset(&self.bodies[body_index]);
            for data in self.bodies[body_index].lifting_surfaces_mut() {
                let (lifting, wake) = data.lifting_surface_and_wake_mut();
                while wake.n_node_rows() < 2 {
                    wake.add_layer(lifting);
                }

                let n_spanwise_nodes = lifting.n_spanwise_nodes();
                let nodes = wake.nodes_mut();
                for j in 0..n_spanwise_nodes {
                    let te = lifting.surface().node(lifting.trailing_edge_node(j));
                    nodes[n_spanwise_nodes + j] = te;
                    nodes[j] = te + offset;
                }
                wake.compute_geometry();
            }
        }
    }

    /// Displacement of the first shed row away from the trailing edge
    fn first_row_displacements(&self, body: &Body, k: usize, dt: f64) -> Vec<Vector3D> {
        let lifting = body.lifting_surfaces()[k].lifting_surface();
        if self.parameters.convect_wake {
            (0..lifting.n_spanwise_nodes())
                .map(|j| self.trailing_edge_emission_displacement(body, lifting, j, dt))
                .collect()
        } else {
            vec![self.static_wake_offset(body); lifting.n_spanwise_nodes()]
        }
    }

    /// Offset from the trailing edge to the far end of a static wake
    fn static_wake_offset(&self, body: &Body) -> Vector3D {
        let apparent = body.velocity() - self.freestream_velocity;
        match apparent.normalize() {
            Some(direction) => direction * -self.parameters.static_wake_length,
            None => {
                log::warn!(
                    "Body '{}' is at rest relative to the freestream, its static wake collapses",
                    body.id()
                );
                Vector3D::zero()
            }
        }
    }

    /// How far a trailing-edge node sheds during one step
    fn trailing_edge_emission_displacement(
        &self,
        body: &Body,
        lifting: &LiftingSurface,
        j: usize,
        dt: f64,
    ) -> Vector3D {
        let apparent = body.node_kinematic_velocity(lifting.surface(), lifting.trailing_edge_node(j))
            - self.freestream_velocity;
        let wake_velocity = if self.parameters.wake_emission_follow_bisector {
            lifting.trailing_edge_bisector(j) * apparent.norm()
        } else {
            -apparent
        };
        wake_velocity * (self.parameters.wake_emission_distance_factor * dt)
    }
}
