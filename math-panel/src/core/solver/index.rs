//! Flat panel numbering across bodies
//!
//! Every non-wake panel gets one global index: bodies in registration order,
//! inside a body its non-lifting surfaces then its lifting surfaces. Each
//! surface owns a contiguous block, located through an offset table keyed by
//! surface identity.

use std::collections::HashMap;

use crate::core::body::Body;
use crate::core::mesh::SurfaceId;

/// Which list of its body a surface comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SurfaceKind {
    NonLifting(usize),
    Lifting(usize),
}

/// Block of the global numbering owned by one surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SurfaceSlot {
    pub body: usize,
    pub kind: SurfaceKind,
    pub offset: usize,
    pub n_panels: usize,
}

impl SurfaceSlot {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.n_panels
    }
}

#[derive(Debug, Default)]
pub(crate) struct PanelIndex {
    slots: Vec<SurfaceSlot>,
    slot_of: HashMap<SurfaceId, usize>,
    body_of: HashMap<SurfaceId, usize>,
    panels: Vec<(usize, usize)>,
}

impl PanelIndex {
    /// Append the surfaces of `body`, which sits at `body_index`
    pub fn register(&mut self, body_index: usize, body: &Body) {
        let non_lifting = body
            .non_lifting_surfaces()
            .iter()
            .enumerate()
            .map(|(k, d)| (SurfaceKind::NonLifting(k), d.surface()));
        let lifting = body
            .lifting_surfaces()
            .iter()
            .enumerate()
            .map(|(k, d)| (SurfaceKind::Lifting(k), d.surface()));

        for (kind, surface) in non_lifting.chain(lifting) {
            let slot = SurfaceSlot {
                body: body_index,
                kind,
                offset: self.panels.len(),
                n_panels: surface.n_panels(),
            };
            let slot_index = self.slots.len();
            self.panels
                .extend((0..slot.n_panels).map(|panel| (slot_index, panel)));
            self.slots.push(slot);
            self.slot_of.insert(surface.id(), slot_index);
            self.body_of.insert(surface.id(), body_index);
        }

        for data in body.lifting_surfaces() {
            self.body_of.insert(data.wake().id(), body_index);
        }
    }

    /// Total number of non-wake panels
    pub fn n_panels(&self) -> usize {
        self.panels.len()
    }

    pub fn slots(&self) -> &[SurfaceSlot] {
        &self.slots
    }

    pub fn slot(&self, id: SurfaceId) -> Option<&SurfaceSlot> {
        self.slot_of.get(&id).map(|&s| &self.slots[s])
    }

    /// Owning body of a surface or wake
    pub fn body_of(&self, id: SurfaceId) -> Option<usize> {
        self.body_of.get(&id).copied()
    }

    /// Slot and local panel of a global panel index
    pub fn locate(&self, panel: usize) -> (&SurfaceSlot, usize) {
        let (slot, local) = self.panels[panel];
        (&self.slots[slot], local)
    }

    /// Global index of `panel` on surface `id`, if both exist
    pub fn global(&self, id: SurfaceId, panel: usize) -> Option<usize> {
        self.slot(id)
            .filter(|slot| panel < slot.n_panels)
            .map(|slot| slot.offset + panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::boundary_layer::DummyBoundaryLayer;
    use crate::core::mesh::{box_mesh, naca4_section, wing};
    use crate::core::types::Vector3D;

    #[test]
    fn test_blocks_are_contiguous_and_ordered() {
        let section = naca4_section("0012", 4).unwrap();
        let lifting = wing(&section, 1.0, 2.0, 3, false).unwrap();
        let wing_id = lifting.surface().id();
        let cube = box_mesh(Vector3D::new(1.0, 1.0, 1.0), [1, 1, 1]).unwrap();
        let cube_id = cube.id();

        // Lifting surface attached first still comes after the non-lifting one
        let body = Body::new("b")
            .with_lifting_surface(lifting, Box::new(DummyBoundaryLayer))
            .with_non_lifting_surface(cube, Box::new(DummyBoundaryLayer));
        let wake_id = body.lifting_surfaces()[0].wake().id();

        let mut index = PanelIndex::default();
        index.register(3, &body);

        assert_eq!(index.slot(cube_id).unwrap().offset, 0);
        assert_eq!(index.slot(wing_id).unwrap().offset, 6);
        assert_eq!(index.slot(wing_id).unwrap().range(), 6..22);
        assert_eq!(index.n_panels(), 6 + 16);
        assert_eq!(index.body_of(wake_id), Some(3));
        assert!(index.slot(wake_id).is_none());
        assert_eq!(index.global(cube_id, 6), None);

        let (slot, local) = index.locate(9);
        assert_eq!(slot.kind, SurfaceKind::Lifting(0));
        assert_eq!(local, 3);
    }
}
