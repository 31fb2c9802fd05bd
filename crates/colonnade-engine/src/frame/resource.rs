use super::backend::GpuBackend;
use super::constants::{MaterialConstants, ObjectConstants, PassConstants};
use super::error::FrameError;
use super::fence::FenceValue;
use super::upload::UploadBuffer;

/// Slot counts every frame resource is built with.
///
/// Counts are frozen at construction; growing the scene means rebuilding
/// every frame resource in the ring.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameResourceDesc {
    pub pass_count: usize,
    pub object_count: usize,
    pub material_count: usize,
}

impl FrameResourceDesc {
    pub fn new(object_count: usize, material_count: usize) -> Self {
        Self {
            pass_count: 1,
            object_count,
            material_count,
        }
    }
}

/// GPU resources owned by one frame in flight.
///
/// A passive bundle: the pipeline decides when it is safe to touch.
pub struct FrameResource<B: GpuBackend> {
    /// Reset at the start of every frame this resource is current for.
    pub allocator: B::Allocator,

    pub pass_cb: UploadBuffer<PassConstants, B::Memory>,
    pub object_cb: UploadBuffer<ObjectConstants, B::Memory>,
    pub material_cb: UploadBuffer<MaterialConstants, B::Memory>,

    /// Fence value signaled after this resource's last submission.
    pub fence: FenceValue,
}

impl<B: GpuBackend> FrameResource<B> {
    /// Allocates the resources for ring slot `index`.
    pub fn new(backend: &B, index: usize, desc: FrameResourceDesc) -> Result<Self, FrameError> {
        let allocator = backend.create_command_allocator(&format!("frame {index} allocator"))?;

        let pass_cb = UploadBuffer::create(
            backend,
            &format!("frame {index} pass constants"),
            desc.pass_count,
            true,
        )?;
        let object_cb = UploadBuffer::create(
            backend,
            &format!("frame {index} object constants"),
            desc.object_count,
            true,
        )?;
        let material_cb = UploadBuffer::create(
            backend,
            &format!("frame {index} material constants"),
            desc.material_count,
            true,
        )?;

        log::debug!(
            "frame resource {index}: {} pass, {} object, {} material slots",
            desc.pass_count,
            desc.object_count,
            desc.material_count
        );

        Ok(Self {
            allocator,
            pass_cb,
            object_cb,
            material_cb,
            fence: FenceValue::NEVER,
        })
    }

    pub fn desc(&self) -> FrameResourceDesc {
        FrameResourceDesc {
            pass_count: self.pass_cb.capacity(),
            object_count: self.object_cb.capacity(),
            material_count: self.material_cb.capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::backend::UploadMemory;
    use crate::frame::host::HostBackend;

    #[test]
    fn buffers_are_sized_from_desc() {
        let backend = HostBackend::default();
        let frame = FrameResource::new(&backend, 0, FrameResourceDesc::new(5, 2)).unwrap();

        assert_eq!(frame.desc(), FrameResourceDesc::new(5, 2));
        assert_eq!(frame.object_cb.memory().size(), 5 * 256);
        assert_eq!(frame.material_cb.memory().size(), 2 * 256);
        assert_eq!(frame.pass_cb.memory().size(), 1280);
        assert_eq!(frame.fence, FenceValue::NEVER);
    }

    #[test]
    fn allocation_failure_aborts_construction() {
        let backend = HostBackend::with_memory_limit(1024);
        let err = FrameResource::new(&backend, 0, FrameResourceDesc::new(100, 1))
            .err()
            .unwrap();
        assert!(matches!(err, FrameError::Allocation { .. }));
    }
}
