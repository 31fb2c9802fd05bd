use crate::frame::{CommandAllocator, FrameError, GpuBackend, UploadMemory};

/// Frame-resource factory on top of a wgpu device.
///
/// Upload memory is a `UNIFORM | COPY_DST` buffer. wgpu has no portable
/// persistently mapped uniform memory, so slot writes go through
/// `Queue::write_buffer`, which stages them for the next submission.
#[derive(Debug, Clone)]
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }
}

impl GpuBackend for WgpuBackend {
    type Memory = WgpuUploadMemory;
    type Allocator = WgpuCommandAllocator;

    fn constant_buffer_alignment(&self) -> u64 {
        self.device.limits().min_uniform_buffer_offset_alignment as u64
    }

    fn create_upload_memory(&self, label: &str, size: u64) -> Result<WgpuUploadMemory, FrameError> {
        let max = self.device.limits().max_buffer_size;
        if size > max {
            return Err(FrameError::allocation(
                label,
                format!("{size} bytes exceeds the device limit of {max}"),
            ));
        }

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(WgpuUploadMemory {
            buffer,
            queue: self.queue.clone(),
            size,
        })
    }

    fn create_command_allocator(&self, label: &str) -> Result<WgpuCommandAllocator, FrameError> {
        Ok(WgpuCommandAllocator {
            device: self.device.clone(),
            label: label.to_string(),
            resets: 0,
        })
    }
}

/// Uniform buffer backing one `UploadBuffer`.
#[derive(Debug)]
pub struct WgpuUploadMemory {
    buffer: wgpu::Buffer,
    queue: wgpu::Queue,
    size: u64,
}

impl WgpuUploadMemory {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl UploadMemory for WgpuUploadMemory {
    fn size(&self) -> u64 {
        self.size
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) {
        self.queue.write_buffer(&self.buffer, offset, bytes);
    }
}

/// Hands out one command encoder per frame.
///
/// wgpu manages encoder storage internally; the allocator exists so the
/// frame protocol can gate recording on the slot's fence.
#[derive(Debug)]
pub struct WgpuCommandAllocator {
    device: wgpu::Device,
    label: String,
    resets: u64,
}

impl WgpuCommandAllocator {
    pub fn reset_count(&self) -> u64 {
        self.resets
    }
}

impl CommandAllocator for WgpuCommandAllocator {
    type Recorder = wgpu::CommandEncoder;

    fn reset(&mut self) -> Result<wgpu::CommandEncoder, FrameError> {
        self.resets += 1;
        Ok(self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&self.label),
            }))
    }
}
