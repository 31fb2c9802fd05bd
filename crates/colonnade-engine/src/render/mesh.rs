use wgpu::util::DeviceExt;

use crate::scene::{MeshGeometry, Vertex};

pub(crate) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3, // normal
        2 => Float32x2  // uv
    ];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

/// Immutable vertex/index buffers for a `MeshGeometry`.
///
/// Uploaded once; the GPU reads them every frame without per-frame copies.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, geometry: &MeshGeometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("colonnade scene vbo"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("colonnade scene ibo"),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "scene geometry uploaded: {} vertices, {} indices",
            geometry.vertices().len(),
            geometry.indices().len()
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices().len() as u32,
        }
    }
}
