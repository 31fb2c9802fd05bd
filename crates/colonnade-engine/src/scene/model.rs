use crate::frame::{
    propagate, ConstantSource, FrameError, FramePipeline, FrameResourceDesc, GpuBackend,
    GpuTimeline,
};

use super::item::{ItemDesc, RenderItem};
use super::material::{Material, MaterialDesc};
use super::mesh::{MeshData, MeshGeometry};
use super::{ItemId, MaterialId, MeshId};

/// Slots written by one `Scene::upload_dirty` call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DirtyUploads {
    pub objects: usize,
    pub materials: usize,
}

/// Meshes, materials and render items.
///
/// Items and materials own the constant-buffer slot equal to their index,
/// assigned in insertion order and stable for the scene's lifetime.
#[derive(Debug)]
pub struct Scene {
    geometry: MeshGeometry,
    materials: Vec<Material>,
    items: Vec<RenderItem>,
    frames_in_flight: usize,
}

impl Scene {
    pub fn builder(frames_in_flight: usize) -> SceneBuilder {
        SceneBuilder::new(frames_in_flight)
    }

    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.index()]
    }

    pub fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.materials.iter().find(|m| m.name() == name).map(Material::id)
    }

    pub fn item(&self, id: ItemId) -> &RenderItem {
        &self.items[id.index()]
    }

    pub fn item_mut(&mut self, id: ItemId) -> &mut RenderItem {
        &mut self.items[id.index()]
    }

    /// Slot counts frame resources need to hold this scene.
    pub fn resource_desc(&self) -> FrameResourceDesc {
        FrameResourceDesc::new(self.items.len(), self.materials.len())
    }

    /// True while any object or material still has uploads pending.
    pub fn is_dirty(&self) -> bool {
        self.items.iter().any(|i| i.dirty().is_dirty())
            || self.materials.iter().any(|m| m.dirty().is_dirty())
    }

    /// Copies every dirty object and material into the pipeline's current
    /// frame resource.
    ///
    /// Must be called between `begin_frame` and `end_frame`. The scene's
    /// dirty counters must span exactly the ring's frame count, otherwise
    /// some ring slots would never see an edit.
    pub fn upload_dirty<B: GpuBackend, T: GpuTimeline>(
        &mut self,
        pipeline: &mut FramePipeline<B, T>,
    ) -> Result<DirtyUploads, FrameError> {
        let ring = pipeline.frames_in_flight();
        if ring != self.frames_in_flight {
            return Err(FrameError::RingMismatch {
                span: self.frames_in_flight,
                ring,
            });
        }

        let frame = pipeline.current_mut()?;
        check_capacity("object", self.items.len(), frame.object_cb.capacity())?;
        check_capacity("material", self.materials.len(), frame.material_cb.capacity())?;

        let objects = propagate(self.items.iter_mut(), &mut frame.object_cb)?;
        let materials = propagate(self.materials.iter_mut(), &mut frame.material_cb)?;

        if objects + materials > 0 {
            log::trace!("uploaded {objects} object and {materials} material constants");
        }

        Ok(DirtyUploads { objects, materials })
    }
}

fn check_capacity(kind: &'static str, required: usize, capacity: usize) -> Result<(), FrameError> {
    if required > capacity {
        return Err(FrameError::CapacityMismatch {
            kind,
            required,
            capacity,
        });
    }
    Ok(())
}

/// Collects scene content. Handles are only valid for the scene it builds.
#[derive(Debug)]
pub struct SceneBuilder {
    frames_in_flight: usize,
    geometry: MeshGeometry,
    materials: Vec<Material>,
    items: Vec<RenderItem>,
}

impl SceneBuilder {
    pub fn new(frames_in_flight: usize) -> Self {
        Self {
            frames_in_flight,
            geometry: MeshGeometry::new(),
            materials: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        self.geometry.push(mesh)
    }

    pub fn add_material(&mut self, name: impl Into<String>, desc: MaterialDesc) -> MaterialId {
        let id = MaterialId(self.materials.len());
        self.materials
            .push(Material::new(name, id, desc, self.frames_in_flight));
        id
    }

    pub fn add_item(&mut self, desc: ItemDesc) -> ItemId {
        debug_assert!(desc.mesh.index() < self.geometry.submeshes().len());
        debug_assert!(desc.material.index() < self.materials.len());

        let id = ItemId(self.items.len());
        self.items
            .push(RenderItem::new(id, desc, self.frames_in_flight));
        id
    }

    pub fn build(self) -> Scene {
        log::debug!(
            "scene built: {} meshes, {} materials, {} items",
            self.geometry.submeshes().len(),
            self.materials.len(),
            self.items.len()
        );

        Scene {
            geometry: self.geometry,
            materials: self.materials,
            items: self.items,
            frames_in_flight: self.frames_in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3, Vec4};

    use super::*;
    use crate::frame::host::{HostBackend, HostTimeline};
    use crate::frame::{FramePipeline, ObjectConstants, PipelineConfig};
    use crate::scene::geometry;

    const N: usize = 3;

    fn pipeline(
        backend: &HostBackend,
        frames_in_flight: usize,
        desc: FrameResourceDesc,
    ) -> FramePipeline<HostBackend, HostTimeline> {
        FramePipeline::new(
            backend,
            HostTimeline::immediate(),
            PipelineConfig { frames_in_flight },
            desc,
        )
        .unwrap()
    }

    fn scene() -> (Scene, ItemId, MaterialId) {
        scene_with_span(N)
    }

    fn scene_with_span(frames_in_flight: usize) -> (Scene, ItemId, MaterialId) {
        let mut b = Scene::builder(frames_in_flight);
        let cube = b.add_mesh(geometry::box_mesh(1.0, 1.0, 1.0));
        let stone = b.add_material("stone", MaterialDesc::default());
        let gold = b.add_material("gold", MaterialDesc::new(Vec4::ONE, 0.05, 0.2));
        b.add_item(ItemDesc::new(cube, stone));
        b.add_item(ItemDesc::new(cube, gold));
        let last = b.add_item(ItemDesc::new(cube, gold));
        (b.build(), last, gold)
    }

    #[test]
    fn slots_follow_insertion_order() {
        let (scene, last, gold) = scene();
        assert_eq!(last.index(), 2);
        assert_eq!(scene.item(last).slot(), 2);
        assert_eq!(scene.material(gold).slot(), 1);
        assert_eq!(scene.find_material("gold"), Some(gold));
        assert_eq!(scene.find_material("brick"), None);
        assert_eq!(scene.resource_desc(), FrameResourceDesc::new(3, 2));
    }

    #[test]
    fn first_frames_upload_everything_once_per_slot() {
        let (mut scene, _, _) = scene();
        let backend = HostBackend::default();
        let mut pipeline = pipeline(&backend, N, scene.resource_desc());

        let mut counts = Vec::new();
        for _ in 0..N + 1 {
            pipeline.begin_frame().unwrap();
            counts.push(scene.upload_dirty(&mut pipeline).unwrap());
            pipeline.end_frame().unwrap();
        }

        let full = DirtyUploads {
            objects: 3,
            materials: 2,
        };
        assert_eq!(counts, vec![full, full, full, DirtyUploads::default()]);
        assert!(!scene.is_dirty());
    }

    #[test]
    fn edit_reaches_every_ring_slot() {
        let (mut scene, last, _) = scene();
        let backend = HostBackend::default();
        let mut pipeline = pipeline(&backend, N, scene.resource_desc());

        for _ in 0..N {
            pipeline.begin_frame().unwrap();
            scene.upload_dirty(&mut pipeline).unwrap();
            pipeline.end_frame().unwrap();
        }

        let world = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        scene.item_mut(last).set_world(world);

        for _ in 0..N {
            pipeline.begin_frame().unwrap();
            let uploads = scene.upload_dirty(&mut pipeline).unwrap();
            assert_eq!(uploads.objects, 1);
            pipeline.end_frame().unwrap();
        }

        let expected = ObjectConstants {
            world: world.to_cols_array_2d(),
            tex_transform: Mat4::IDENTITY.to_cols_array_2d(),
        };
        for frame in pipeline.resources().iter() {
            let offset = frame.object_cb.offset_of(2).unwrap() as usize;
            let bytes = frame.object_cb.memory().bytes();
            assert_eq!(
                &bytes[offset..offset + std::mem::size_of::<ObjectConstants>()],
                bytemuck::bytes_of(&expected)
            );
        }
    }

    #[test]
    fn undersized_frame_resource_is_rejected() {
        let (mut scene, _, _) = scene();
        let backend = HostBackend::default();
        let mut pipeline = pipeline(&backend, N, FrameResourceDesc::new(2, 2));
        pipeline.begin_frame().unwrap();

        let err = scene.upload_dirty(&mut pipeline).unwrap_err();

        assert!(matches!(
            err,
            FrameError::CapacityMismatch {
                kind: "object",
                required: 3,
                capacity: 2
            }
        ));
        // Nothing was consumed.
        assert!(scene.items().iter().all(|i| i.dirty().remaining() == N as u32));
    }

    #[test]
    fn dirty_span_must_match_ring_size() {
        // Counters spanning 2 frames against a 3-slot ring would leave one
        // slot holding stale constants after an edit.
        let (mut scene, _, _) = scene_with_span(2);
        let backend = HostBackend::default();
        let mut pipeline = pipeline(&backend, 3, scene.resource_desc());

        for _ in 0..4 {
            pipeline.begin_frame().unwrap();
            let err = scene.upload_dirty(&mut pipeline).unwrap_err();
            assert!(matches!(err, FrameError::RingMismatch { span: 2, ring: 3 }));
            pipeline.end_frame().unwrap();
        }

        assert!(scene.items().iter().all(|i| i.dirty().remaining() == 2));
        assert!(scene.materials().iter().all(|m| m.dirty().remaining() == 2));
        for frame in pipeline.resources().iter() {
            assert_eq!(frame.object_cb.memory().write_count(), 0);
            assert_eq!(frame.material_cb.memory().write_count(), 0);
        }
    }

    #[test]
    fn upload_outside_a_frame_is_rejected() {
        let (mut scene, _, _) = scene();
        let backend = HostBackend::default();
        let mut pipeline = pipeline(&backend, N, scene.resource_desc());

        let err = scene.upload_dirty(&mut pipeline).unwrap_err();

        assert!(matches!(err, FrameError::NoFrameInProgress));
        assert!(scene.is_dirty());
    }
}
