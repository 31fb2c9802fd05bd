use glam::Mat4;

use crate::frame::{ConstantSource, DirtyCounter, ObjectConstants};

use super::{ItemId, MaterialId, MeshId};

/// What to draw, with what, and where.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ItemDesc {
    pub mesh: MeshId,
    pub material: MaterialId,
    pub world: Mat4,
    pub tex_transform: Mat4,
}

impl ItemDesc {
    pub fn new(mesh: MeshId, material: MaterialId) -> Self {
        Self {
            mesh,
            material,
            world: Mat4::IDENTITY,
            tex_transform: Mat4::IDENTITY,
        }
    }

    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    pub fn with_tex_transform(mut self, tex_transform: Mat4) -> Self {
        self.tex_transform = tex_transform;
        self
    }
}

/// One draw call. Owns one slot of the object constant buffer.
#[derive(Debug, Clone)]
pub struct RenderItem {
    id: ItemId,
    mesh: MeshId,
    material: MaterialId,
    world: Mat4,
    tex_transform: Mat4,
    dirty: DirtyCounter,
}

impl RenderItem {
    pub(crate) fn new(id: ItemId, desc: ItemDesc, frames_in_flight: usize) -> Self {
        Self {
            id,
            mesh: desc.mesh,
            material: desc.material,
            world: desc.world,
            tex_transform: desc.tex_transform,
            dirty: DirtyCounter::new(frames_in_flight),
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn tex_transform(&self) -> Mat4 {
        self.tex_transform
    }

    pub fn set_world(&mut self, world: Mat4) {
        self.world = world;
        self.dirty.mark();
    }

    pub fn set_tex_transform(&mut self, tex_transform: Mat4) {
        self.tex_transform = tex_transform;
        self.dirty.mark();
    }
}

impl ConstantSource for RenderItem {
    type Constants = ObjectConstants;

    fn slot(&self) -> usize {
        self.id.index()
    }

    fn dirty(&self) -> &DirtyCounter {
        &self.dirty
    }

    fn dirty_mut(&mut self) -> &mut DirtyCounter {
        &mut self.dirty
    }

    fn constants(&self) -> ObjectConstants {
        ObjectConstants {
            world: self.world.to_cols_array_2d(),
            tex_transform: self.tex_transform.to_cols_array_2d(),
        }
    }
}
